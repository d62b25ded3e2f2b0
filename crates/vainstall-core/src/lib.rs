//! vainstall core library
//!
//! Builds and executes the provisioning plan that installs the GPU video
//! analytics stack: i915 firmware, libva, the media driver, Media SDK, TBB,
//! the OpenCL runtime and the vision toolkit.

pub mod config;
pub mod context;
pub mod error;
pub mod firmware;
pub mod libcheck;
pub mod manifest;
pub mod mode;
pub mod plan;
pub mod privilege;
pub mod report;
pub mod runner;
pub mod sequencer;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::config::{ConfigStore, ProvisionConfig};
    pub use crate::context::ProvisionContext;
    pub use crate::error::ProvisionError;
    pub use crate::firmware::FirmwareVariant;
    pub use crate::mode::{InstallMode, Invocation, ParseError};
    pub use crate::plan::{Block, Plan, Step, build_plan};
    pub use crate::report::{ProvisionReport, StepOutcome};
    pub use crate::runner::{CommandOutput, CommandRunner, DryRunRunner, ShellRunner};
    pub use crate::sequencer::{ProgressObserver, Sequencer};
    pub use crate::types::{FailurePolicy, LogLevel};
}
