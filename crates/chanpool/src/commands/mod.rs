//! Subcommand handlers.

pub mod config_cmd;
pub mod plan;
pub mod run;

use chanpool_config::Settings;
use chanpool_core::WebQueryChannelApi;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load and resolve the configuration named by `--config` (or the default).
pub fn load_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    let cfg = chanpool_config::load_config(global.config.as_deref())?;
    Ok(chanpool_config::resolve(&cfg)?)
}

/// Single connection attempt, no retry.
pub async fn connect(settings: &Settings) -> Result<WebQueryChannelApi, CliError> {
    Ok(WebQueryChannelApi::connect(&settings.controller).await?)
}
