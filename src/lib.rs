pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::dashboard::PropertyFilter;
use crate::providers::HttpPropertyApi;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Runs the intake wizard, interactively or from a prepared draft file.
    Add { draft_path: Option<String> },
    Dashboard { filter: PropertyFilter },
    Show { id: String },
    /// Deletes a stored property; `assume_yes` skips the confirmation prompt.
    Delete { id: String, assume_yes: bool },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Property intake starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let api = HttpPropertyApi::new(&config.api)?;

    match command {
        AppCommand::Add { draft_path } => {
            cli::add::run(&api, &config.currency, draft_path.as_deref()).await
        }
        AppCommand::Dashboard { filter } => {
            cli::dashboard::run(&api, &filter, &config.currency).await
        }
        AppCommand::Show { id } => cli::show::run(&api, &id, &config.currency).await,
        AppCommand::Delete { id, assume_yes } => cli::delete::run(&api, &id, assume_yes).await,
    }
}
