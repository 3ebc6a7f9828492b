// Content Hub server

use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use content_hub::{api::create_router, app_state::AppState, config::Config};

const SESSION_SWEEP_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let address = config.server_address();

    let app_state = AppState::new(config).await?;

    let identity = app_state.identity.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_SECS));
        loop {
            interval.tick().await;
            let removed = identity.cleanup_expired_sessions().await;
            if removed > 0 {
                info!("Removed {} expired sessions", removed);
            }
        }
    });

    let app = create_router(app_state);

    info!("Content Hub API starting on http://{}", address);
    info!("  GET    /api/v1/pages                 - List pages");
    info!("  GET    /api/v1/pages/{{id}}            - Get page");
    info!("  POST   /api/v1/pages/save            - Save page draft");
    info!("  GET    /api/v1/media                 - List media");
    info!("  GET    /api/v1/dashboard             - Dashboard stats");

    let listener = TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
