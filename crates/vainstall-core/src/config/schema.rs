//! Configuration schema for vainstall.toml

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::manifest::ToolkitPackage;
use crate::types::{FailurePolicy, LogLevel};

/// Root configuration structure for vainstall.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Where sources are cloned and built (defaults to the current directory)
    pub work_dir: Option<PathBuf>,

    /// Install root for TBB and Media SDK
    pub install_prefix: PathBuf,

    /// Kernel firmware directory for i915 blobs
    pub firmware_dir: PathBuf,

    /// Shell profile receiving the exports (defaults to ~/.bashrc)
    pub profile: Option<PathBuf>,

    /// Dynamic loader config entry
    pub ld_conf: PathBuf,

    /// Parallel jobs for libva, media driver and TBB builds
    pub make_jobs: u32,

    /// Parallel jobs for the Media SDK build
    pub sdk_make_jobs: u32,

    pub on_failure: FailurePolicy,

    pub log_level: LogLevel,

    /// Revision overrides keyed by repository name
    pub pins: HashMap<String, String>,

    pub toolkit: ToolkitPackage,

    pub legacy_toolkit: ToolkitPackage,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            install_prefix: PathBuf::from("/opt/intel"),
            firmware_dir: PathBuf::from("/lib/firmware/i915"),
            profile: None,
            ld_conf: PathBuf::from("/etc/ld.so.conf.d/libdrm-intel.conf"),
            make_jobs: 4,
            sdk_make_jobs: 8,
            on_failure: FailurePolicy::default(),
            log_level: LogLevel::default(),
            pins: HashMap::new(),
            toolkit: ToolkitPackage::openvino(),
            legacy_toolkit: ToolkitPackage::legacy_cvsdk(),
        }
    }
}

impl ProvisionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.make_jobs == 0 || self.sdk_make_jobs == 0 {
            anyhow::bail!("make_jobs and sdk_make_jobs must be at least 1");
        }
        for (key, path) in [
            ("install_prefix", &self.install_prefix),
            ("firmware_dir", &self.firmware_dir),
            ("ld_conf", &self.ld_conf),
        ] {
            if !path.is_absolute() {
                anyhow::bail!("{} must be an absolute path: {}", key, path.display());
            }
        }
        self.toolkit.validate()?;
        self.legacy_toolkit.validate()?;
        Ok(())
    }
}
