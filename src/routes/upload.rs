use crate::{error::AppError, media::MediaClient};
use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    url: String,
    public_id: String,
}

pub async fn upload_image(
    State(media): State<MediaClient>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request("Invalid multipart body").with_debug(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request("Invalid multipart body").with_debug(e.to_string()))?;

        file = Some((filename, content_type, data.to_vec()));
    }

    let Some((filename, content_type, data)) = file else {
        return Err(AppError::bad_request("No file provided"));
    };

    if !content_type.starts_with("image/") {
        return Err(AppError::bad_request("File must be an image"));
    }

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::bad_request("File size must be less than 10MB"));
    }

    let stored = media.upload(data, &filename, &content_type).await?;

    Ok(Json(UploadResponse {
        url: stored.url,
        public_id: stored.public_id,
    }))
}
