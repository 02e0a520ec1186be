use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use citrine::config::{AppConfig, MediaConfig};
use citrine::media::MediaClient;
use citrine::routes::upload::MAX_UPLOAD_BYTES;
use citrine::{AppState, routes};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app(pool: PgPool) -> Router {
    let config = AppConfig {
        database_url: String::new(),
        run_migrations: false,
        server_addr: "127.0.0.1:0".to_string(),
        media: MediaConfig {
            // Never reached: the upload tests stop at validation.
            upload_url: "http://127.0.0.1:9/upload".to_string(),
            upload_preset: "test".to_string(),
            folder: None,
        },
    };
    routes::create_router(AppState {
        db: pool,
        media: MediaClient::new(config.media.clone()),
        config,
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn create_author(app: &Router, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/authors",
        Some(json!({
            "name": "Test Author",
            "email": email,
            "password": "hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn create_post(app: &Router, author_id: &str, slug: &str, tags: Value) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/posts",
        Some(json!({
            "title": format!("Post {slug}"),
            "slug": slug,
            "content": "<p>Hello</p>",
            "authorId": author_id,
            "tags": tags,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_is_rejected(pool: PgPool) {
    let app = test_app(pool);
    create_author(&app, "ada@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/authors",
        Some(json!({
            "name": "Imposter",
            "email": "ada@example.com",
            "password": "hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/api/authors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn invalid_role_is_rejected(pool: PgPool) {
    let app = test_app(pool);

    let (status, _) = send(
        &app,
        "POST",
        "/api/authors",
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2",
            "role": "superuser",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn post_with_unknown_author_is_rejected(pool: PgPool) {
    let app = test_app(pool);

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        Some(json!({
            "title": "Orphan",
            "slug": "orphan",
            "content": "<p>Hello</p>",
            "authorId": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_slug_is_rejected(pool: PgPool) {
    let app = test_app(pool);
    let author = create_author(&app, "ada@example.com").await;
    let author_id = author["id"].as_str().unwrap();
    create_post(&app, author_id, "first-post", json!([])).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        Some(json!({
            "title": "Duplicate",
            "slug": "first-post",
            "content": "<p>Again</p>",
            "authorId": author_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn login_failure_does_not_reveal_account_existence(pool: PgPool) {
    let app = test_app(pool);
    create_author(&app, "ada@example.com").await;

    let (wrong_password_status, wrong_password_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    let (unknown_email_status, unknown_email_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "nobody@example.com", "password": "wrong" })),
    )
    .await;

    assert_eq!(wrong_password_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[sqlx::test(migrations = "./migrations")]
async fn login_returns_author_without_password(pool: PgPool) {
    let app = test_app(pool);
    create_author(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "ada@example.com", "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn me_resolves_the_bearer_token(pool: PgPool) {
    let app = test_app(pool);
    let author = create_author(&app, "ada@example.com").await;
    let author_id = author["id"].as_str().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {author_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleted_post_is_gone(pool: PgPool) {
    let app = test_app(pool);
    let author = create_author(&app, "ada@example.com").await;
    let author_id = author["id"].as_str().unwrap();
    create_post(&app, author_id, "ephemeral", json!([])).await;

    let (status, _) = send(&app, "DELETE", "/api/posts/ephemeral", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/posts/ephemeral", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn related_posts_share_at_least_one_tag(pool: PgPool) {
    let app = test_app(pool);
    let author = create_author(&app, "ada@example.com").await;
    let author_id = author["id"].as_str().unwrap();
    create_post(&app, author_id, "post-a", json!(["x", "y"])).await;
    create_post(&app, author_id, "post-b", json!(["y"])).await;
    create_post(&app, author_id, "post-c", json!(["z"])).await;

    let (status, body) = send(&app, "GET", "/api/posts/post-a", None).await;
    assert_eq!(status, StatusCode::OK);

    let slugs: Vec<&str> = body["relatedPosts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert!(slugs.contains(&"post-b"));
    assert!(!slugs.contains(&"post-c"));
    assert!(!slugs.contains(&"post-a"));
}

#[sqlx::test(migrations = "./migrations")]
async fn post_detail_joins_the_author(pool: PgPool) {
    let app = test_app(pool);
    let author = create_author(&app, "ada@example.com").await;
    let author_id = author["id"].as_str().unwrap();
    create_post(&app, author_id, "post-a", json!([])).await;

    let (status, body) = send(&app, "GET", "/api/posts/post-a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "post-a");
    assert_eq!(body["author"]["name"], "Test Author");
    assert_eq!(body["author"]["id"], author_id);
}

#[sqlx::test(migrations = "./migrations")]
async fn popular_tags_rank_by_post_count(pool: PgPool) {
    let app = test_app(pool);
    let author = create_author(&app, "ada@example.com").await;
    let author_id = author["id"].as_str().unwrap();
    create_post(&app, author_id, "post-a", json!(["a", "a", "b"])).await;
    create_post(&app, author_id, "post-b", json!(["a", "c"])).await;

    let (status, body) = send(&app, "GET", "/api/tags/popular", None).await;
    assert_eq!(status, StatusCode::OK);

    let ranked = body.as_array().unwrap();
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0], json!({ "tag": "a", "count": 2 }));
    assert_eq!(ranked[1]["count"], 1);
    assert_eq!(ranked[2]["count"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn author_update_keeps_password_unless_replaced(pool: PgPool) {
    let app = test_app(pool);
    let author = create_author(&app, "ada@example.com").await;
    let author_id = author["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/authors/{author_id}"),
        Some(json!({ "bio": "Writes about Rust." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Writes about Rust.");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "ada@example.com", "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn author_update_rejects_taken_email(pool: PgPool) {
    let app = test_app(pool);
    create_author(&app, "ada@example.com").await;
    let other = create_author(&app, "grace@example.com").await;
    let other_id = other["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/authors/{other_id}"),
        Some(json!({ "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

fn multipart_upload(content_type: &str, data: Vec<u8>) -> Request<Body> {
    let boundary = "citrine-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn upload_rejects_non_image_files(pool: PgPool) {
    let app = test_app(pool);

    let response = app
        .oneshot(multipart_upload("text/plain", b"hello".to_vec()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "File must be an image");
}

#[sqlx::test(migrations = "./migrations")]
async fn upload_rejects_oversized_images(pool: PgPool) {
    let app = test_app(pool);

    let response = app
        .oneshot(multipart_upload("image/png", vec![0u8; MAX_UPLOAD_BYTES + 1]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "File size must be less than 10MB");
}

#[sqlx::test(migrations = "./migrations")]
async fn contact_acknowledges_complete_submissions(pool: PgPool) {
    let app = test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/contact",
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Hello there",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, body) = send(
        &app,
        "POST",
        "/api/contact",
        Some(json!({ "name": "Ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}
