//! i915 display microcontroller firmware selection.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Build target string that selects the Broxton firmware.
pub const BXT_TARGET: &str = "BXT";

/// Directory inside the linux-firmware checkout holding i915 blobs.
pub const I915_SUBDIR: &str = "i915";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FirmwareVariant {
    /// Skylake, the default for any target other than BXT
    Skl,
    /// Broxton
    Bxt,
}

impl FirmwareVariant {
    pub fn for_target(target: &str) -> Self {
        if target == BXT_TARGET {
            Self::Bxt
        } else {
            Self::Skl
        }
    }

    /// Versioned blob shipped by linux-firmware.
    pub fn blob(self) -> &'static str {
        match self {
            Self::Skl => "skl_dmc_ver1_27.bin",
            Self::Bxt => "bxt_dmc_ver1_07.bin",
        }
    }

    /// Unversioned name the kernel driver requests.
    pub fn link_name(self) -> &'static str {
        match self {
            Self::Skl => "skl_dmc_ver1.bin",
            Self::Bxt => "bxt_dmc_ver1.bin",
        }
    }

    /// Blob location inside a linux-firmware checkout.
    pub fn source_path(self, checkout: &Path) -> PathBuf {
        checkout.join(I915_SUBDIR).join(self.blob())
    }
}
