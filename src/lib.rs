pub mod api;
pub mod compatibility;
pub mod config;
pub mod core_state;
pub mod db;
pub mod directory;
pub mod eligibility;
pub mod geo;
pub mod models;
pub mod registry;
pub mod validation;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, Settings};
use crate::core_state::{CoreError, CoreState};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load settings, open the registry database and serve the API until
/// Ctrl-C.
pub async fn run() -> Result<(), RunError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    std::fs::create_dir_all(config::app_data_dir())?;
    let settings = Settings::load(&config::settings_path())?;
    let bind_addr = settings.bind_addr;
    let core = Arc::new(CoreState::open(&config::database_path(), settings)?);

    let mut server = api::start_api_server(core, bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.wait().await;
    Ok(())
}
