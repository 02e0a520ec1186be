use citrine::config::AppConfig;
use citrine::media::MediaClient;
use citrine::{AppState, db, routes};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = AppConfig::load().expect("Failed to load config.toml");

    let pool = db::setup_database(&settings).await?;
    let state = AppState {
        db: pool,
        media: MediaClient::new(settings.media.clone()),
        config: settings.clone(),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("listening on {}", settings.server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
