use crate::error::AppError;
use crate::models::Author;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::PgPool;
use uuid::Uuid;

/// The author making the request, resolved from the `Authorization` header.
///
/// The dashboard sends back the id it received from login as a bearer
/// token. TODO: issue opaque session tokens at login instead of trusting
/// the raw row id.
pub struct CurrentAuthor(pub Author);

impl<S> FromRequestParts<S> for CurrentAuthor
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = PgPool::from_ref(state);

        let token = parts
            .headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(AppError::unauthorized)?;

        let id = Uuid::parse_str(token).map_err(|_| AppError::unauthorized())?;

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
                id = $1",
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(CurrentAuthor(author))
    }
}
