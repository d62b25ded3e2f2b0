//! Post-install lookup of the runtime libraries the stack provides.

use std::path::PathBuf;

use crate::context::ProvisionContext;
use crate::mode::InstallMode;
use crate::plan::env::MULTIARCH_LIB_DIR;

const DEFAULT_LIB_DIR: &str = "/usr/lib64";

/// Library files expected after a run in `mode`.
pub fn expected_libraries(mode: &InstallMode) -> Vec<&'static str> {
    let mut libs = vec!["libOpenCL.so"];
    if mode.enable_msdk() {
        libs.insert(0, "libva.so");
        libs.push("libmfx.so");
    }
    libs
}

/// Directories to search: `LD_LIBRARY_PATH` entries, then the system
/// defaults, then `extra`, without duplicates.
pub fn search_paths(ld_library_path: Option<&str>, extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let candidates = ld_library_path
        .unwrap_or("")
        .split(':')
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .chain([DEFAULT_LIB_DIR, MULTIARCH_LIB_DIR].map(PathBuf::from))
        .chain(extra.iter().cloned());
    for path in candidates {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

pub fn find_library(name: &str, paths: &[PathBuf]) -> Option<PathBuf> {
    paths
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}

/// Expected libraries that cannot be found for this context.
pub fn missing_libraries(mode: &InstallMode, ctx: &ProvisionContext) -> Vec<String> {
    let ld_path = std::env::var("LD_LIBRARY_PATH").ok();
    let extra = [
        ctx.mediasdk_prefix().join("lib"),
        ctx.tbb_root().join("lib"),
    ];
    missing_in(mode, &search_paths(ld_path.as_deref(), &extra))
}

pub fn missing_in(mode: &InstallMode, paths: &[PathBuf]) -> Vec<String> {
    expected_libraries(mode)
        .into_iter()
        .filter(|lib| find_library(lib, paths).is_none())
        .map(str::to_string)
        .collect()
}
