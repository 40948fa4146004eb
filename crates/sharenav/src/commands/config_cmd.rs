//! Config subcommand handlers.

use sharenav_config::save_config_to;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_path(global);

    match args.command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let cfg = config::resolve(global)?;
            // Validate before writing anything.
            cfg.to_session_config()?;
            save_config_to(&path, &cfg)?;
            output::print_status(
                &format!("Config written to {}", path.display()),
                output::should_color(global.color),
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let rendered = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)?,
            };
            output::print_output(rendered.trim_end());
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string());
            Ok(())
        }
    }
}
