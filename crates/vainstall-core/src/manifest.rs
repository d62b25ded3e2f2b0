//! Pinned sources and vendor packages that make up the stack.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

pub const LINUX_FIRMWARE_URL: &str =
    "https://git.kernel.org/pub/scm/linux/kernel/git/firmware/linux-firmware.git";

pub const LIBVA: &str = "libva";
pub const LIBVA_UTILS: &str = "libva-utils";
pub const MEDIA_DRIVER: &str = "media-driver";
pub const GMMLIB: &str = "gmmlib";
pub const MEDIA_SDK: &str = "MediaSDK";
pub const TBB: &str = "tbb";

/// Clone order for the Media SDK prerequisites.
const PINNED_SOURCES: [(&str, &str, &str); 6] = [
    (
        LIBVA,
        "https://github.com/01org/libva.git",
        "285267586a3d4db0e721d30d4a5f5f9fe6a3c913",
    ),
    (
        LIBVA_UTILS,
        "https://github.com/01org/libva-utils.git",
        "375e4eaae3377c1806e83874f9fa9b79b1f225b1",
    ),
    (
        MEDIA_DRIVER,
        "https://github.com/intel/media-driver.git",
        "840c756952419510566248734138c68b5b6bc76f",
    ),
    (
        GMMLIB,
        "https://github.com/intel/gmmlib.git",
        "5cd8dca50b1f6ddbce229098dc2bec55fc922fa7",
    ),
    (
        MEDIA_SDK,
        "https://github.com/Intel-Media-SDK/MediaSDK.git",
        "2130888ffd1b7f3c5c4c975020840b30556786a7",
    ),
    (
        TBB,
        "https://github.com/01org/tbb.git",
        "4c73c3b5d7f78c40f69e0c04fd4afb9f48add1e6",
    ),
];

pub const NEO_RELEASE_URL: &str =
    "https://github.com/intel/compute-runtime/releases/download/18.45.11804/";

const NEO_PACKAGES: [&str; 4] = [
    "intel-gmmlib_18.4.0.348_amd64.deb",
    "intel-igc-core_18.44.1060_amd64.deb",
    "intel-igc-opencl_18.44.1060_amd64.deb",
    "intel-opencl_18.45.11804_amd64.deb",
];

/// A git repository checked out at an optional pinned revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub url: String,
    pub revision: Option<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// Directory name `git clone` creates for this URL.
    pub fn clone_dir_name(&self) -> anyhow::Result<String> {
        let parsed = Url::parse(&self.url)
            .with_context(|| format!("Invalid repository URL for {}: {}", self.name, self.url))?;
        let last = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .ok_or_else(|| anyhow::anyhow!("Repository URL has no path: {}", self.url))?;
        Ok(last.strip_suffix(".git").unwrap_or(last).to_string())
    }

    pub fn checkout_dir(&self, work_dir: &Path) -> anyhow::Result<PathBuf> {
        Ok(work_dir.join(self.clone_dir_name()?))
    }
}

/// The set of pinned repositories, with optional per-name overrides.
#[derive(Debug, Clone)]
pub struct Manifest {
    repositories: Vec<Repository>,
}

impl Manifest {
    pub fn builtin() -> Self {
        let repositories = PINNED_SOURCES
            .iter()
            .map(|(name, url, rev)| Repository::new(*name, *url).with_revision(*rev))
            .collect();
        Self { repositories }
    }

    /// Replace pinned revisions by repository name.
    pub fn with_pins(mut self, pins: &HashMap<String, String>) -> anyhow::Result<Self> {
        for (name, revision) in pins {
            let repo = self
                .repositories
                .iter_mut()
                .find(|r| &r.name == name)
                .ok_or_else(|| anyhow::anyhow!("Unknown repository in pins: {}", name))?;
            repo.revision = Some(revision.clone());
        }
        Ok(self)
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn get(&self, name: &str) -> anyhow::Result<&Repository> {
        self.repositories
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| anyhow::anyhow!("Repository not in manifest: {}", name))
    }

    pub fn linux_firmware() -> Repository {
        Repository::new("linux-firmware", LINUX_FIRMWARE_URL)
    }
}

/// A vendor toolkit shipped as a tarball with a silent installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolkitPackage {
    /// Archive name without `.tgz`; also the extracted directory name
    pub archive_stem: String,
    /// Download location; when absent the archive must already be staged
    #[serde(default)]
    pub url: Option<String>,
    /// Silent installer answers file, copied from the working directory
    #[serde(default = "default_silent_config")]
    pub silent_config: String,
}

fn default_silent_config() -> String {
    "silent.cfg".to_string()
}

impl ToolkitPackage {
    pub fn openvino() -> Self {
        Self {
            archive_stem: "l_openvino_toolkit_p_2018.4.420".to_string(),
            url: Some(
                "http://registrationcenter-download.intel.com/akdlm/irc_nas/14920/l_openvino_toolkit_p_2018.4.420.tgz"
                    .to_string(),
            ),
            silent_config: default_silent_config(),
        }
    }

    pub fn legacy_cvsdk() -> Self {
        Self {
            archive_stem: "intel_cv_sdk_ubuntu_r3".to_string(),
            url: None,
            silent_config: default_silent_config(),
        }
    }

    pub fn archive_name(&self) -> String {
        format!("{}.tgz", self.archive_stem)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.archive_stem.trim().is_empty() {
            anyhow::bail!("Toolkit archive_stem must not be empty");
        }
        if let Some(url) = &self.url {
            Url::parse(url).with_context(|| format!("Invalid toolkit URL: {}", url))?;
        }
        Ok(())
    }
}

/// Download URLs for the OpenCL Neo runtime packages.
pub fn neo_package_urls() -> anyhow::Result<Vec<String>> {
    let base = Url::parse(NEO_RELEASE_URL).context("Invalid Neo release URL")?;
    NEO_PACKAGES
        .iter()
        .map(|pkg| {
            base.join(pkg)
                .map(|u| u.to_string())
                .with_context(|| format!("Invalid Neo package name: {}", pkg))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_dir_strips_git_suffix() {
        let repo = Repository::new("sdk", "https://github.com/Intel-Media-SDK/MediaSDK.git");
        assert_eq!(repo.clone_dir_name().unwrap(), "MediaSDK");
    }

    #[test]
    fn builtin_manifest_pins_every_repository() {
        let manifest = Manifest::builtin();
        assert_eq!(manifest.repositories().len(), 6);
        assert!(manifest.repositories().iter().all(|r| r.revision.is_some()));
        assert_eq!(
            manifest.get(TBB).unwrap().revision.as_deref(),
            Some("4c73c3b5d7f78c40f69e0c04fd4afb9f48add1e6")
        );
    }

    #[test]
    fn pins_override_revision() {
        let pins = HashMap::from([(LIBVA.to_string(), "abc123".to_string())]);
        let manifest = Manifest::builtin().with_pins(&pins).unwrap();
        assert_eq!(
            manifest.get(LIBVA).unwrap().revision.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn unknown_pin_is_an_error() {
        let pins = HashMap::from([("ffmpeg".to_string(), "abc".to_string())]);
        let err = Manifest::builtin().with_pins(&pins).unwrap_err();
        assert!(err.to_string().contains("ffmpeg"));
    }

    #[test]
    fn neo_urls_share_release_base() {
        let urls = neo_package_urls().unwrap();
        assert_eq!(urls.len(), 4);
        assert!(urls.iter().all(|u| u.starts_with(NEO_RELEASE_URL)));
        assert!(urls[3].ends_with("intel-opencl_18.45.11804_amd64.deb"));
    }

    #[test]
    fn legacy_toolkit_has_no_download() {
        let pkg = ToolkitPackage::legacy_cvsdk();
        assert!(pkg.url.is_none());
        assert_eq!(pkg.archive_name(), "intel_cv_sdk_ubuntu_r3.tgz");
    }
}
