use crate::{
    error::AppError,
    models::{Author, is_valid_role},
    password,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::task::spawn_blocking;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// The password column never leaves the handler layer.
impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            email: author.email,
            bio: author.bio,
            avatar: author.avatar,
            role: author.role,
            created_at: author.created_at,
            updated_at: author.updated_at,
        }
    }
}

const AUTHOR_COLUMNS: &str = "id,
    name,
    email,
    password,
    bio,
    avatar,
    role,
    created_at,
    updated_at";

pub async fn get_authors(State(pool): State<PgPool>) -> Result<Json<Vec<AuthorResponse>>, AppError> {
    let query = format!("SELECT {AUTHOR_COLUMNS} FROM authors");
    let authors = sqlx::query_as::<_, Author>(&query).fetch_all(&pool).await?;

    let response: Vec<AuthorResponse> = authors.into_iter().map(|a| a.into()).collect();

    Ok(Json(response))
}

pub async fn get_one_author(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Json<AuthorResponse>, AppError> {
    let query = format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = $1");
    let author = sqlx::query_as::<_, Author>(&query)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(author.into()))
}

#[derive(Deserialize)]
pub struct CreateAuthorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
}

pub async fn create_author(
    State(pool): State<PgPool>,
    payload: Result<Json<CreateAuthorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthorResponse>), AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::bad_request("Invalid request body").with_debug(e.to_string()))?;

    let (Some(name), Some(email), Some(plaintext)) = (
        payload.name.filter(|s| !s.trim().is_empty()),
        payload.email.filter(|s| !s.trim().is_empty()),
        payload.password.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::bad_request(
            "Missing required fields: name, email, and password are required",
        ));
    };

    let role = payload.role.unwrap_or_else(|| "author".to_string());
    if !is_valid_role(&role) {
        return Err(AppError::bad_request(
            "Invalid role. Must be either \"author\" or \"admin\"",
        ));
    }

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM authors WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict(
            "An author with this email already exists",
        ));
    }

    let hashed = spawn_blocking(move || password::hash(&plaintext))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {e}"))??;

    let query = format!(
        r#"INSERT INTO authors (
            id,
            name,
            email,
            password,
            bio,
            avatar,
            role
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING
            {AUTHOR_COLUMNS}"#
    );
    let author = sqlx::query_as::<_, Author>(&query)
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&email)
        .bind(&hashed)
        .bind(&payload.bio)
        .bind(&payload.avatar)
        .bind(&role)
        .fetch_one(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(author.into())))
}

#[derive(Deserialize)]
pub struct UpdateAuthorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
}

pub async fn update_author(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateAuthorRequest>, JsonRejection>,
) -> Result<Json<AuthorResponse>, AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::bad_request("Invalid request body").with_debug(e.to_string()))?;

    let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM authors WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }

    if let Some(role) = payload.role.as_deref() {
        if !is_valid_role(role) {
            return Err(AppError::bad_request(
                "Invalid role. Must be either \"author\" or \"admin\"",
            ));
        }
    }

    if let Some(email) = payload.email.as_deref() {
        let taken =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM authors WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(id)
                .fetch_optional(&pool)
                .await?;
        if taken.is_some() {
            return Err(AppError::conflict(
                "An author with this email already exists",
            ));
        }
    }

    // Re-hash only when a new password was supplied.
    let hashed = match payload.password.filter(|s| !s.trim().is_empty()) {
        Some(plaintext) => Some(
            spawn_blocking(move || password::hash(&plaintext))
                .await
                .map_err(|e| anyhow::anyhow!("Password hashing task failed: {e}"))??,
        ),
        None => None,
    };

    let query = format!(
        r#"UPDATE
            authors
        SET
            name = COALESCE($1, name),
            email = COALESCE($2, email),
            password = COALESCE($3, password),
            bio = COALESCE($4, bio),
            avatar = COALESCE($5, avatar),
            role = COALESCE($6, role),
            updated_at = $7
        WHERE
            id = $8
        RETURNING
            {AUTHOR_COLUMNS}"#
    );
    let author = sqlx::query_as::<_, Author>(&query)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&hashed)
        .bind(&payload.bio)
        .bind(&payload.avatar)
        .bind(&payload.role)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&pool)
        .await?;

    Ok(Json(author.into()))
}

pub async fn delete_author(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM authors WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
