//! Config subcommand handlers.

use chanpool_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = global.config.clone().unwrap_or_else(config::config_path);

    match args.command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config(&Config::default(), &path)?;
            eprintln!("Configuration written to {}", path.display());
            eprintln!("Set groups.chat.parent / groups.training.parent and an API key, then run: chanpool run");
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = config::load_config(global.config.as_deref())?;
            if cfg.server.api_key.is_some() {
                cfg.server.api_key = Some(REDACTED.into());
            }
            let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            })?;
            output::print_output(rendered.trim_end());
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string());
            Ok(())
        }
    }
}
