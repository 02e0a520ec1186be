pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod media;
pub mod models;
pub mod params;
pub mod password;
pub mod routes;

use crate::config::AppConfig;
use crate::media::MediaClient;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub media: MediaClient,
}

impl FromRef<AppState> for sqlx::PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for MediaClient {
    fn from_ref(state: &AppState) -> Self {
        state.media.clone()
    }
}
