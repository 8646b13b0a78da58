pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod tracker;

use crate::cli::summary::ViewMode;
use crate::core::config::AppConfig;
use crate::store::KeyValueStore;
use crate::tracker::Tracker;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Prices,
    Summary { view: ViewMode },
    Watch { view: ViewMode },
    ResetBaseline,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("goldfolio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = KeyValueStore::open(&config.default_data_path()?);
    let tracker = Arc::new(Tracker::from_config(&config, &store)?);

    match command {
        AppCommand::Prices => cli::prices::run(&tracker).await,
        AppCommand::Summary { view } => cli::summary::run(&tracker, &config.holdings, view).await,
        AppCommand::Watch { view } => {
            cli::watch::run(tracker, &config.holdings, view, config.poll_interval()).await
        }
        AppCommand::ResetBaseline => {
            tracker.aggregator().reset_baseline().await;
            println!("Price baseline cleared");
            Ok(())
        }
    }
}
