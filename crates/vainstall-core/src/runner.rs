//! Execution boundary for external commands.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::Context;
use serde::Serialize;

use crate::plan::ShellCommand;

/// Exit status and combined stdout/stderr of one command chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub fn succeeded() -> Self {
        Self {
            status: Some(0),
            output: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs shell command chains on behalf of the sequencer.
///
/// `Err` means the command could not be started at all; a command that ran
/// and failed is an `Ok` with a non-zero status.
pub trait CommandRunner {
    fn run(&mut self, command: &ShellCommand) -> anyhow::Result<CommandOutput>;
}

/// Runs commands through `sh -c` and waits for each to finish.
#[derive(Debug, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &ShellCommand) -> anyhow::Result<CommandOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command.script()).stdin(Stdio::null());
        if let Some(dir) = command.cwd() {
            cmd.current_dir(dir);
        }
        for (key, value) in command.env_vars() {
            cmd.env(key, value);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run: {}", command.render()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            status: output.status.code(),
            output: text,
        })
    }
}

/// Prints each command instead of running it.
#[derive(Debug)]
pub struct DryRunRunner<W: Write> {
    out: W,
}

impl<W: Write> DryRunRunner<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandRunner for DryRunRunner<W> {
    fn run(&mut self, command: &ShellCommand) -> anyhow::Result<CommandOutput> {
        writeln!(self.out, "{}", command.render()).context("Failed to write dry-run output")?;
        Ok(CommandOutput::succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_runner_captures_output_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ShellCommand::in_dir(dir.path())
            .env("VAINSTALL_TEST", "hello")
            .then("echo $VAINSTALL_TEST")
            .then("pwd");
        let out = ShellRunner::new().run(&cmd).unwrap();
        assert!(out.success());
        assert!(out.output.contains("hello"));
    }

    #[test]
    fn shell_runner_reports_failure_status() {
        let cmd = ShellCommand::new().then("exit 3");
        let out = ShellRunner::new().run(&cmd).unwrap();
        assert_eq!(out.status, Some(3));
        assert!(!out.success());
    }

    #[test]
    fn chain_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("after");
        let cmd = ShellCommand::new()
            .then("false")
            .then(format!("touch {}", marker.display()));
        let out = ShellRunner::new().run(&cmd).unwrap();
        assert!(!out.success());
        assert!(!marker.exists());
    }

    #[test]
    fn missing_working_directory_is_an_error() {
        let cmd = ShellCommand::in_dir("/nonexistent/vainstall/dir").then("true");
        assert!(ShellRunner::new().run(&cmd).is_err());
    }

    #[test]
    fn dry_run_prints_rendered_command() {
        let mut runner = DryRunRunner::new(Vec::new());
        let cmd = ShellCommand::in_dir("/w").then("make install");
        assert!(runner.run(&cmd).unwrap().success());
        let printed = String::from_utf8(runner.into_inner()).unwrap();
        assert_eq!(printed, "cd /w && make install\n");
    }
}
