//! Root privilege check.

use crate::error::ProvisionError;

/// Fail unless the process runs with effective uid 0.
pub fn ensure_privileged() -> Result<(), ProvisionError> {
    check_euid(nix::unistd::geteuid().as_raw())
}

pub fn check_euid(euid: u32) -> Result<(), ProvisionError> {
    if euid == 0 {
        Ok(())
    } else {
        Err(ProvisionError::InsufficientPrivilege { euid })
    }
}
