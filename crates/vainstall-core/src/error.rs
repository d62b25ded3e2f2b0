//! Error types surfaced by the provisioning library.

use thiserror::Error;

/// Fatal conditions that stop provisioning before any step runs.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Must be run as root. Exiting.")]
    InsufficientPrivilege { euid: u32 },
}
