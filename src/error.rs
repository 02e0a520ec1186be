use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{message}")]
    BadRequest {
        message: String,
        debug: Option<String>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized")
    }

    pub fn invalid_credentials() -> Self {
        Self::Unauthorized("Invalid credentials")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            debug: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Attach the underlying rejection text for the log without leaking it
    /// to the client.
    pub fn with_debug(self, debug: impl Into<String>) -> Self {
        match self {
            Self::BadRequest { message, .. } => Self::BadRequest {
                message,
                debug: Some(debug.into()),
            },
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database Error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_string())
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.to_string()),
            AppError::BadRequest { message, debug } => {
                if let Some(debug_info) = debug {
                    tracing::debug!("Bad request: {debug_info}");
                }
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::Anyhow(ref e) => {
                tracing::error!("System Error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
