//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vainstall_core::config::ProvisionConfig;
use vainstall_core::context::ProvisionContext;
use vainstall_core::plan::ShellCommand;
use vainstall_core::runner::{CommandOutput, CommandRunner};

/// Isolated host layout: work dir, home, install prefix and system paths all
/// live under one temp directory.
pub struct Sandbox {
    pub temp: TempDir,
    pub ctx: ProvisionContext,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut ProvisionConfig)) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        let work = root.join("work");
        let home = root.join("home");
        std::fs::create_dir_all(&work).expect("Failed to create work dir");
        std::fs::create_dir_all(&home).expect("Failed to create home dir");

        let mut config = ProvisionConfig::new();
        config.install_prefix = root.join("opt").join("intel");
        config.firmware_dir = root.join("lib").join("firmware").join("i915");
        config.ld_conf = root.join("etc").join("ld.so.conf.d").join("libdrm-intel.conf");
        customize(&mut config);

        let ctx = ProvisionContext::new(config, work, &home).expect("Failed to build context");
        Self { temp, ctx }
    }

    pub fn work(&self) -> &Path {
        self.ctx.work_dir()
    }

    pub fn profile(&self) -> PathBuf {
        self.ctx.profile().to_path_buf()
    }
}

/// Records every command and simulates the few that leave traces on disk:
/// `git clone` creates the target directory, `curl -o` writes its output file
/// and `mv` renames. Within a chain, the first command containing `fail_on`
/// exits with status 1 and the rest of the chain does not run.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub commands: Vec<String>,
    pub fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        Self {
            commands: Vec::new(),
            fail_on: Some(pattern.to_string()),
        }
    }

    pub fn clone_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| c.contains("git clone"))
            .count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &ShellCommand) -> anyhow::Result<CommandOutput> {
        self.commands.push(command.render());
        let cwd = command.cwd().map(Path::to_path_buf).unwrap_or_default();

        for cmd in command.commands() {
            let args: Vec<&str> = cmd
                .split_whitespace()
                .map(|arg| arg.trim_matches('\''))
                .collect();

            // curl creates its output file before the transfer can fail.
            if args.first() == Some(&"curl")
                && let Some(pos) = args.iter().position(|arg| *arg == "-o")
                && let Some(dest) = args.get(pos + 1)
            {
                std::fs::write(cwd.join(dest), b"partial")?;
            }

            if let Some(pattern) = &self.fail_on
                && cmd.contains(pattern.as_str())
            {
                return Ok(CommandOutput {
                    status: Some(1),
                    output: format!("simulated failure: {}", pattern),
                });
            }

            match args.as_slice() {
                ["git", "clone", .., dest] => std::fs::create_dir_all(dest)?,
                ["mv", from, to] => std::fs::rename(cwd.join(from), cwd.join(to))?,
                _ => {}
            }
        }
        Ok(CommandOutput::succeeded())
    }
}
