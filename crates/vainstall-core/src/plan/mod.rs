//! Provisioning plans.
//!
//! A plan is the ordered list of steps for one mode. It is built up front from
//! the mode and the resolved context, so what will run can be inspected (or
//! printed in a dry run) before anything touches the host.

mod builder;
pub mod env;
pub mod shell;

use std::path::PathBuf;

use serde::Serialize;

use crate::mode::InstallMode;

pub use builder::build_plan;
pub use shell::ShellCommand;

/// Contiguous group of steps sharing a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Block {
    Firmware,
    Layout,
    Sources,
    Libva,
    MediaDriver,
    Tbb,
    Toolkit,
    OpenCl,
    MediaSdk,
    Environment,
}

impl Block {
    /// Blocks dropped by `-nomsdk`.
    pub fn requires_msdk(self) -> bool {
        !matches!(self, Self::Layout | Self::Toolkit | Self::OpenCl)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Firmware => "Update i915 display firmware",
            Self::Layout => "Install required tools and create build environment",
            Self::Sources => "Pull all the source code",
            Self::Libva => "Build and install libVA",
            Self::MediaDriver => "Build and install media driver",
            Self::Tbb => "Build and install TBB",
            Self::Toolkit => "Install vision toolkit",
            Self::OpenCl => "Install OpenCL runtime",
            Self::MediaSdk => "Build and install Media SDK and samples",
            Self::Environment => "Set environment variables",
        }
    }
}

/// Runtime precondition checked right before a step executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    SkipIfExists(PathBuf),
    RunIfExists(PathBuf),
    SkipIfFileContains { path: PathBuf, needle: String },
}

impl Guard {
    /// Why the guarded step should be skipped, if it should.
    pub fn skip_reason(&self) -> Option<String> {
        match self {
            Self::SkipIfExists(path) if path.exists() => {
                Some(format!("{} already exists", path.display()))
            }
            Self::RunIfExists(path) if !path.exists() => {
                Some(format!("{} does not exist", path.display()))
            }
            Self::SkipIfFileContains { path, needle } => std::fs::read(path)
                .ok()
                .filter(|content| contains_bytes(content, needle.as_bytes()))
                .map(|_| format!("{} is already configured", path.display())),
            _ => None,
        }
    }
}

// Profiles are not guaranteed to be UTF-8.
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub label: String,
    pub block: Block,
    pub command: ShellCommand,
    pub guard: Option<Guard>,
}

impl Step {
    pub fn new(block: Block, label: impl Into<String>, command: ShellCommand) -> Self {
        Self {
            label: label.into(),
            block,
            command,
            guard: None,
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    mode: InstallMode,
    steps: Vec<Step>,
}

impl Plan {
    pub fn new(mode: InstallMode, steps: Vec<Step>) -> Self {
        Self { mode, steps }
    }

    pub fn mode(&self) -> &InstallMode {
        &self.mode
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Blocks in execution order.
    pub fn blocks(&self) -> Vec<Block> {
        let mut blocks: Vec<Block> = self.steps.iter().map(|s| s.block).collect();
        blocks.dedup();
        blocks
    }
}
