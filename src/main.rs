//! Service entry point.

use taskboard::api;
use taskboard::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskboard=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Starting taskboard v{} (board: {}, dev_mode: {})",
        env!("CARGO_PKG_VERSION"),
        config.board_id,
        config.dev_mode
    );

    api::serve(config).await
}
