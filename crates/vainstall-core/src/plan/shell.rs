//! Shell command assembly.

use std::path::{Path, PathBuf};

/// A chain of shell commands run in one `sh -c` invocation.
///
/// Commands are joined with `&&`, so a failing command ends its step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellCommand {
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
    commands: Vec<String>,
}

impl ShellCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a chain that runs inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn then(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Script passed to `sh -c`; the working directory and environment are
    /// applied by the runner.
    pub fn script(&self) -> String {
        self.commands.join(" && ")
    }

    /// Self-contained form for logs and dry runs.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(dir) = &self.cwd {
            parts.push(format!("cd {}", quote_path(dir)));
        }
        for (key, value) in &self.env {
            parts.push(format!("export {}={}", key, quote(value)));
        }
        parts.extend(self.commands.iter().cloned());
        parts.join(" && ")
    }
}

/// Single-quote a value for POSIX sh unless it is plainly safe.
pub fn quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-:=+@%,".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}
