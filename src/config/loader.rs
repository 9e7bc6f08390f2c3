// Configuration loader
// Resolves ~/.atles/config.toml (or ATLES_CONFIG / --config) into a Config

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;
use crate::errors;

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV_VAR: &str = "ATLES_CONFIG";

/// `~/.atles`
pub fn atles_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".atles"))
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(atles_home()?.join("config.toml"))
}

/// Load configuration.
///
/// An explicit path (flag, then `ATLES_CONFIG`) must exist. The default
/// path is optional; when it is absent built-in defaults are used.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!(errors::file_not_found_error(
                &path.display().to_string(),
                "Configuration file"
            ));
        }
        return load_config_file(&path);
    }

    let path = default_config_path()?;
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    load_config_file(&path)
}

/// Read and validate a specific config file
pub fn load_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&contents)?;

    // Relative rule packs are resolved against the config file's directory
    if let (Some(rules_file), Some(dir)) = (&config.truth_seeking.rules_file, path.parent()) {
        if rules_file.is_relative() {
            config.truth_seeking.rules_file = Some(dir.join(rules_file));
        }
    }

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate TOML config text
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)
        .map_err(|e| anyhow::anyhow!(errors::config_parse_error(&e.to_string())))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}
