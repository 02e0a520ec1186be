use crate::config::MediaConfig;
use anyhow::{Result, anyhow};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// A stored image on the media host.
pub struct MediaUpload {
    pub url: String,
    pub public_id: String,
}

#[derive(Deserialize)]
struct MediaHostResponse {
    secure_url: String,
    public_id: String,
}

/// Client for the third-party media host's unsigned upload endpoint.
#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    config: MediaConfig,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Proxy an already-validated image to the media host.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<MediaUpload> {
        let part = Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| anyhow!("Invalid upload content type: {e}"))?;

        let mut form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone());
        if let Some(folder) = &self.config.folder {
            form = form.text("folder", folder.clone());
        }

        let response = self
            .http
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Media host rejected the upload: {}",
                response.status()
            ));
        }

        let body: MediaHostResponse = response.json().await?;
        Ok(MediaUpload {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }
}
