//! Config store for locating and loading vainstall.toml.

use std::path::{Path, PathBuf};

use super::{ProvisionConfig, parser};

pub const CONFIG_FILE_NAME: &str = "vainstall.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at `<config_dir>/vainstall/vainstall.toml`.
    pub fn from_default_location() -> anyhow::Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("vainstall");
        Ok(Self::from_path(dir.join(CONFIG_FILE_NAME)))
    }

    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<ProvisionConfig> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(ProvisionConfig::new());
        }
        parser::parse_config_toml(&self.config_path)
    }

    /// Like [`load`](Self::load), but a missing file is an error. Used for
    /// paths the user named explicitly.
    pub fn load_required(&self) -> anyhow::Result<ProvisionConfig> {
        if !self.config_path.exists() {
            anyhow::bail!("Config file not found: {}", self.config_path.display());
        }
        parser::parse_config_toml(&self.config_path)
    }
}
