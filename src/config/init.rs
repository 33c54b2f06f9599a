use anyhow::{bail, Result};
use std::path::PathBuf;

use super::{get_config_path, save_config, Config};

/// Write the built-in questionnaires to a config file as a starting point
/// for customisation.
///
/// Refuses to replace an existing file unless `force` is set. Returns the path
/// written to.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if config_path.exists() && !force {
        bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    save_config(&config_path, &Config::builtin())?;
    Ok(config_path)
}
