//! Shared value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the sequencer does when an external command fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next step
    #[default]
    Continue,
    /// Stop at the first failed step
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            _ => Err(format!(
                "Unknown failure policy: {}. Use 'continue' or 'abort'",
                s
            )),
        }
    }
}

/// Console verbosity. Each level includes the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Success,
    #[default]
    Info,
}

impl LogLevel {
    /// Whether a message of `level` should be shown at this verbosity.
    pub fn allows(self, level: LogLevel) -> bool {
        level <= self
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "success" | "ok" => Ok(Self::Success),
            "info" => Ok(Self::Info),
            _ => Err(format!(
                "Unknown log level: {}. Use 'error', 'success' or 'info'",
                s
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Success => "success",
            Self::Info => "info",
        };
        f.write_str(name)
    }
}
