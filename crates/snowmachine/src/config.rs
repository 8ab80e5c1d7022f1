//! Loading `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use snowmachine_core::SnowConfig;
use tracing::info;

/// Environment variable that points at an alternative config file.
const CONFIG_ENV: &str = "SNOWMACHINE_CONFIG";

/// Platform directories for snowmachine.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "snowmachine")
}

/// Where the config file is looked up.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config file, falling back to defaults when there is none.
pub fn load() -> Result<SnowConfig> {
    match config_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => {
            info!("no config file found, using defaults");
            Ok(SnowConfig::default())
        }
    }
}

pub fn load_from(path: &Path) -> Result<SnowConfig> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let config = parse(&text).wrap_err_with(|| format!("invalid config in {}", path.display()))?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parse and validate a config document.
pub fn parse(text: &str) -> Result<SnowConfig> {
    let config: SnowConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}
