//! Resolved paths and settings for one provisioning run.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::ProvisionConfig;
use crate::manifest::Manifest;

/// Everything the plan builder needs to turn a mode into concrete commands.
///
/// Frontends create this once, after the config is loaded and command-line
/// overrides are applied.
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    work_dir: PathBuf,
    profile: PathBuf,
    manifest: Manifest,
    config: ProvisionConfig,
}

impl ProvisionContext {
    /// Create a context with explicit work and home directories.
    pub fn new(config: ProvisionConfig, work_dir: PathBuf, home_dir: &Path) -> anyhow::Result<Self> {
        config.validate()?;
        let manifest = Manifest::builtin()
            .with_pins(&config.pins)
            .context("Failed to apply repository pins")?;
        let profile = config
            .profile
            .clone()
            .unwrap_or_else(|| home_dir.join(".bashrc"));

        Ok(Self {
            work_dir,
            profile,
            manifest,
            config,
        })
    }

    /// Resolve the work directory from the override, the config, or the
    /// current directory, in that order.
    pub fn from_environment(
        config: ProvisionConfig,
        work_dir_override: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let work_dir = match work_dir_override.or_else(|| config.work_dir.clone()) {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let work_dir = if work_dir.is_absolute() {
            work_dir
        } else {
            std::env::current_dir()
                .context("Failed to read current directory")?
                .join(work_dir)
        };
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Self::new(config, work_dir, &home_dir)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn profile(&self) -> &Path {
        &self.profile
    }

    /// Out-of-tree build directory for the media driver.
    pub fn build_dir(&self) -> PathBuf {
        self.work_dir.join("build")
    }

    /// Download directory for the OpenCL runtime packages.
    pub fn neo_dir(&self) -> PathBuf {
        self.work_dir.join("neo")
    }

    pub fn install_prefix(&self) -> &Path {
        &self.config.install_prefix
    }

    pub fn tbb_root(&self) -> PathBuf {
        self.config.install_prefix.join("tbb")
    }

    pub fn mediasdk_prefix(&self) -> PathBuf {
        self.config.install_prefix.join("mediasdk")
    }
}
