use crate::routes::authors::AuthorResponse;
use crate::{error::AppError, extractors::CurrentAuthor, models::Author, password};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use sqlx::PgPool;
use tokio::task::spawn_blocking;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Failure is the same 401 whether the email is unknown or the password is
/// wrong, so the endpoint cannot be used to enumerate accounts.
pub async fn login(
    State(pool): State<PgPool>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthorResponse>, AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::bad_request("Invalid request body").with_debug(e.to_string()))?;

    let (Some(email), Some(plaintext)) = (
        payload.email.filter(|s| !s.trim().is_empty()),
        payload.password.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::bad_request("Email and password required"));
    };

    let author = sqlx::query_as::<_, Author>(
        "SELECT
            id,
            name,
            email,
            password,
            bio,
            avatar,
            role,
            created_at,
            updated_at
        FROM
            authors
        WHERE
            email = $1",
    )
    .bind(&email)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(AppError::invalid_credentials)?;

    let stored_hash = author.password.clone();
    let matched = spawn_blocking(move || password::verify(&plaintext, &stored_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Password verification task failed: {e}"))??;

    if !matched {
        return Err(AppError::invalid_credentials());
    }

    Ok(Json(author.into()))
}

pub async fn me(CurrentAuthor(author): CurrentAuthor) -> Json<AuthorResponse> {
    Json(author.into())
}
