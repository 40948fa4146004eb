//! Config resolution with CLI flag overrides.

use std::path::PathBuf;

use sharenav_config::{Config, config_path, load_config_from};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `SHARENAV_CONFIG`, else the platform path.
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file and environment, then apply flags on top.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&active_path(global))?;

    if let Some(ref url) = global.directory {
        cfg.directory_url.clone_from(url);
    }
    if let Some(ref url) = global.relay {
        cfg.relay_url.clone_from(url);
    }
    if let Some(ref identity) = global.identity {
        cfg.identity = Some(identity.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    if global.insecure {
        cfg.insecure = true;
    }

    Ok(cfg)
}
