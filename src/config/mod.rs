pub mod schema;

pub use schema::AgentConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File name of the config inside the home directory.
pub const CONFIG_FILE_NAME: &str = "ctf-agent.toml";

/// Default ctf-agent home directory (~/.ctf-agent).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".ctf-agent"))
        .unwrap_or_else(|| PathBuf::from(".ctf-agent"))
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AgentConfig =
            toml::from_str(&contents).context("Failed to parse ctf-agent config (TOML)")?;
        Ok(config)
    } else {
        Ok(AgentConfig::default())
    }
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &AgentConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}
