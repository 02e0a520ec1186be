use crate::routes::tags::{self, TagCount};
use crate::{error::AppError, models::Post, params::SearchParams};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    Date,
    Title,
}

#[derive(Deserialize)]
pub struct PostParams {
    #[serde(flatten)]
    base: SearchParams<PostSort>,
    tag: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    id: Uuid,
    title: String,
    slug: String,
    content: String,
    excerpt: Option<String>,
    featured_image: Option<String>,
    tags: serde_json::Value,
    author_id: Uuid,
    read_time: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            excerpt: post.excerpt,
            featured_image: post.featured_image,
            tags: post.tags,
            author_id: post.author_id,
            read_time: post.read_time,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    id: Uuid,
    name: String,
    bio: Option<String>,
    avatar: Option<String>,
}

#[derive(Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPost {
    id: Uuid,
    title: String,
    slug: String,
    excerpt: Option<String>,
    featured_image: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    post: PostResponse,
    author: Option<AuthorSummary>,
    related_posts: Vec<RelatedPost>,
    popular_tags: Vec<TagCount>,
}

const POST_COLUMNS: &str = "id,
    title,
    slug,
    content,
    excerpt,
    featured_image,
    tags,
    author_id,
    read_time,
    created_at,
    updated_at";

pub async fn get_posts(
    State(pool): State<PgPool>,
    params: Result<Query<PostParams>, QueryRejection>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let Query(params) = params.map_err(|e| {
        AppError::bad_request("Invalid query parameters").with_debug(e.to_string())
    })?;

    let column = match params.base.sort() {
        Some(PostSort::Title) => "REGEXP_REPLACE(title, '^(The|A|An)\\s+', '', 'i')",
        _ => "created_at",
    };
    let direction = params.base.sort_by().to_sql();

    let search_pattern = params.base.search().map(|s| format!("%{}%", s));

    let query = format!(
        r#"SELECT
            {POST_COLUMNS}
        FROM
            posts
        WHERE
            ($3::TEXT IS NULL OR tags ? $3)
        AND
            ($4::TEXT IS NULL OR title ILIKE $4)
        ORDER BY
            {} {}
        LIMIT $1 OFFSET $2"#,
        column, direction
    );
    let posts = sqlx::query_as::<_, Post>(&query)
        .bind(params.base.limit())
        .bind(params.base.offset())
        .bind(&params.tag)
        .bind(search_pattern)
        .fetch_all(&pool)
        .await?;

    let response: Vec<PostResponse> = posts.into_iter().map(|p| p.into()).collect();

    Ok(Json(response))
}

pub async fn get_one_post(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailResponse>, AppError> {
    let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(&slug)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let author = sqlx::query_as::<_, (Uuid, String, Option<String>, Option<String>)>(
        "SELECT id, name, bio, avatar FROM authors WHERE id = $1",
    )
    .bind(post.author_id)
    .fetch_optional(&pool)
    .await?
    .map(|(id, name, bio, avatar)| AuthorSummary {
        id,
        name,
        bio,
        avatar,
    });

    let tag_names = tag_list(&post.tags)?;
    let related_posts = related_posts(&pool, &post.slug, &tag_names).await?;
    let popular_tags = tags::fetch_popular_tags(&pool).await?;

    Ok(Json(PostDetailResponse {
        post: post.into(),
        author,
        related_posts,
        popular_tags,
    }))
}

// Up to 3 posts sharing any tag, in store order; overlap size does not rank.
async fn related_posts(
    pool: &PgPool,
    slug: &str,
    tags: &[String],
) -> Result<Vec<RelatedPost>, AppError> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let related = sqlx::query_as::<_, RelatedPost>(
        r#"SELECT
            id,
            title,
            slug,
            excerpt,
            featured_image,
            created_at
        FROM
            posts
        WHERE
            slug <> $1
        AND
            tags ?| $2
        LIMIT 3"#,
    )
    .bind(slug)
    .bind(tags)
    .fetch_all(pool)
    .await?;

    Ok(related)
}

fn tag_list(tags: &serde_json::Value) -> Result<Vec<String>, AppError> {
    serde_json::from_value(tags.clone())
        .map_err(|_| AppError::Anyhow(anyhow::anyhow!("Failed to parse tags")))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author_id: Option<Uuid>,
    pub read_time: Option<String>,
}

pub async fn create_post(
    State(pool): State<PgPool>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::bad_request("Invalid request body").with_debug(e.to_string()))?;

    let (Some(title), Some(slug), Some(content), Some(author_id)) = (
        payload.title.filter(|s| !s.trim().is_empty()),
        payload.slug.filter(|s| !s.trim().is_empty()),
        payload.content.filter(|s| !s.trim().is_empty()),
        payload.author_id,
    ) else {
        return Err(AppError::bad_request("Missing required fields"));
    };

    let tags_json = serde_json::to_value(payload.tags.unwrap_or_default())
        .map_err(|_| AppError::Anyhow(anyhow::anyhow!("Failed to parse tags")))?;

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM posts WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict("A post with this slug already exists"));
    }

    let author_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM authors WHERE id = $1")
        .bind(author_id)
        .fetch_optional(&mut *tx)
        .await?;
    if author_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let query = format!(
        r#"INSERT INTO posts (
            id,
            title,
            slug,
            content,
            excerpt,
            featured_image,
            tags,
            author_id,
            read_time
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING
            {POST_COLUMNS}"#
    );
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(Uuid::new_v4())
        .bind(&title)
        .bind(&slug)
        .bind(&content)
        .bind(&payload.excerpt)
        .bind(&payload.featured_image)
        .bind(&tags_json)
        .bind(author_id)
        .bind(&payload.read_time)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author_id: Option<Uuid>,
    pub read_time: Option<String>,
}

pub async fn update_post(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::bad_request("Invalid request body").with_debug(e.to_string()))?;

    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM posts WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(new_slug) = payload.slug.as_deref().filter(|s| *s != slug) {
        let taken =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM posts WHERE slug = $1 AND id <> $2")
                .bind(new_slug)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if taken.is_some() {
            return Err(AppError::conflict("A post with this slug already exists"));
        }
    }

    if let Some(author_id) = payload.author_id {
        let author_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM authors WHERE id = $1")
            .bind(author_id)
            .fetch_optional(&mut *tx)
            .await?;
        if author_exists.is_none() {
            return Err(AppError::NotFound);
        }
    }

    let tags_json = payload
        .tags
        .map(serde_json::to_value)
        .transpose()
        .map_err(|_| AppError::Anyhow(anyhow::anyhow!("Failed to parse tags")))?;

    let query = format!(
        r#"UPDATE
            posts
        SET
            title = COALESCE($1, title),
            slug = COALESCE($2, slug),
            content = COALESCE($3, content),
            excerpt = COALESCE($4, excerpt),
            featured_image = COALESCE($5, featured_image),
            tags = COALESCE($6, tags),
            author_id = COALESCE($7, author_id),
            read_time = COALESCE($8, read_time),
            updated_at = $9
        WHERE
            id = $10
        RETURNING
            {POST_COLUMNS}"#
    );
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(&payload.title)
        .bind(&payload.slug)
        .bind(&payload.content)
        .bind(&payload.excerpt)
        .bind(&payload.featured_image)
        .bind(&tags_json)
        .bind(payload.author_id)
        .bind(&payload.read_time)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(post.into()))
}

pub async fn delete_post(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM posts WHERE slug = $1")
        .bind(&slug)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
