//! Persistent environment written at the end of an MSDK install.

use std::path::Path;

use super::shell::{quote, quote_path};
use crate::context::ProvisionContext;

/// First line of the block appended to the shell profile. Its presence marks
/// the profile as already configured.
pub const PROFILE_MARKER: &str = "# vainstall: video analytics environment";

pub const MULTIARCH_LIB_DIR: &str = "/usr/lib/x86_64-linux-gnu";
pub const LIBVA_DRIVER_NAME: &str = "iHD";

pub fn profile_exports(ctx: &ProvisionContext) -> Vec<String> {
    vec![
        PROFILE_MARKER.to_string(),
        format!("export MFX_HOME={}", ctx.mediasdk_prefix().display()),
        format!(
            "export LD_LIBRARY_PATH=$LD_LIBRARY_PATH:{}:/usr/lib",
            MULTIARCH_LIB_DIR
        ),
        format!("export LIBVA_DRIVERS_PATH={}/dri", MULTIARCH_LIB_DIR),
        format!("export LIBVA_DRIVER_NAME={}", LIBVA_DRIVER_NAME),
        format!(
            "export LD_LIBRARY_PATH=$LD_LIBRARY_PATH:{}",
            ctx.tbb_root().join("lib").display()
        ),
    ]
}

pub fn ld_conf_entries() -> Vec<String> {
    vec![MULTIARCH_LIB_DIR.to_string(), "/usr/lib".to_string()]
}

/// Contents of `<tbb_root>/bin/tbbvars.sh`.
pub fn tbbvars(tbb_root: &Path) -> Vec<String> {
    vec![
        format!("export TBBROOT={}", tbb_root.display()),
        format!("export LIBRARY_PATH={}", tbb_root.join("lib").display()),
        format!("export CPATH={}", tbb_root.join("include").display()),
    ]
}

/// `printf` invocation writing `lines` to `target`, appending or truncating.
pub fn write_lines(lines: &[String], target: &Path, append: bool) -> String {
    let args: Vec<String> = lines.iter().map(|l| quote(l)).collect();
    format!(
        "printf '%s\\n' {} {} {}",
        args.join(" "),
        if append { ">>" } else { ">" },
        quote_path(target)
    )
}
