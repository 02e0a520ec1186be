use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

// Submissions are only logged; there is no persistence or mail dispatch.
pub async fn submit_contact(payload: Result<Json<ContactRequest>, JsonRejection>) -> Response {
    let Ok(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "Invalid request" })),
        )
            .into_response();
    };

    let (Some(name), Some(email), Some(message)) = (
        payload.name.filter(|s| !s.trim().is_empty()),
        payload.email.filter(|s| !s.trim().is_empty()),
        payload.message.filter(|s| !s.trim().is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "Missing fields" })),
        )
            .into_response();
    };

    tracing::info!(%name, %email, %message, "Contact form submission");

    Json(json!({ "ok": true })).into_response()
}
