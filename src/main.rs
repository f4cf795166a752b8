// src/main.rs

use anyhow::{Context, Result};
use dotenv::dotenv;
use parley::{
    config::{get_config, initialize_config},
    logging::init_logging,
    ui::run_ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    initialize_config().context("Failed to load configuration")?;
    let config = get_config();

    let _logger = init_logging(&config).context("Failed to initialize logging")?;
    log::info!("Starting parley against {}", config.backend_url);

    run_ui(&config).await.context("Terminal UI failed")?;

    log::info!("parley exited");
    Ok(())
}
