pub mod schema;

use std::path::{Path, PathBuf};

pub use schema::{ConfigMessage, DisplayConfig};

use crate::error::AgentlineError;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "AGENTLINE_CONFIG";

/// Load the display configuration.
///
/// An explicit `path` must exist and parse. Otherwise the default location is
/// tried, and a missing or broken file there falls back to defaults. Warnings
/// are printed to stderr; validation errors fail the load.
pub fn load(path: Option<&Path>) -> Result<DisplayConfig, AgentlineError> {
    let config = match path {
        Some(p) => read(p)?,
        None => match default_path() {
            Some(p) if p.exists() => read(&p).unwrap_or_else(|err| {
                tracing::debug!(path = %p.display(), error = %err, "ignoring unusable config");
                DisplayConfig::default()
            }),
            _ => DisplayConfig::default(),
        },
    };

    for msg in config.validate() {
        match msg {
            ConfigMessage::Warning(w) => {
                eprintln!("config warning: {}", w);
            }
            ConfigMessage::Error(e) => return Err(AgentlineError::Config(e)),
        }
    }

    Ok(config)
}

fn read(path: &Path) -> Result<DisplayConfig, AgentlineError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// `$AGENTLINE_CONFIG`, else `agentline/config.toml` in the platform config
/// directory (~/.config on Linux).
pub fn default_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        if !p.is_empty() {
            return Some(PathBuf::from(p));
        }
    }
    dirs::config_dir().map(|d| d.join("agentline").join("config.toml"))
}
