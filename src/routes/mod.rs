pub mod auth;
pub mod authors;
pub mod contact;
pub mod posts;
pub mod tags;
pub mod upload;

use crate::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/authors", author_routes())
        .nest("/api/posts", post_routes())
        .nest("/api/tags", tag_routes())
        .nest("/api/upload", upload_routes())
        .nest("/api/contact", contact_routes())
        .with_state(state)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

pub fn author_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(authors::get_authors).post(authors::create_author))
        .route(
            "/{id}",
            get(authors::get_one_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
}

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::get_posts).post(posts::create_post))
        .route(
            "/{slug}",
            get(posts::get_one_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
}

pub fn tag_routes() -> Router<AppState> {
    Router::new().route("/popular", get(tags::popular_tags))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upload::upload_image))
        // Above the 10MB ceiling so the handler's own check answers instead
        // of a bare 413.
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES + 1024 * 1024))
}

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/", post(contact::submit_contact))
}
