//! Colored status lines for the terminal.

use console::{Style, style};

use vainstall_core::plan::{Block, Step};
use vainstall_core::report::StepOutcome;
use vainstall_core::sequencer::ProgressObserver;
use vainstall_core::types::LogLevel;

const RULE: &str =
    "************************************************************************";

/// Prints `[ ERROR ]`, `[ WARNING ]`, `[ OK ]` and `[ INFO ]` lines filtered by level.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    level: LogLevel,
    to_stderr: bool,
}

impl Console {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            to_stderr: false,
        }
    }

    /// Send status lines to stderr, keeping stdout for machine output.
    pub fn on_stderr(mut self) -> Self {
        self.to_stderr = true;
        self
    }

    pub fn error(&self, msg: &str) {
        self.emit(LogLevel::Error, " [ ERROR ] ", Style::new().red().bold(), msg);
    }

    /// Shown at every level, like errors.
    pub fn warning(&self, msg: &str) {
        if let Some(line) = self.warning_line(msg) {
            self.line(&line);
        }
    }

    fn warning_line(&self, msg: &str) -> Option<String> {
        self.format(LogLevel::Error, " [ WARNING ] ", Style::new().yellow().bold(), msg)
    }

    pub fn success(&self, msg: &str) {
        self.emit(LogLevel::Success, " [ OK ] ", Style::new().green().bold(), msg);
    }

    pub fn info(&self, msg: &str) {
        self.emit(LogLevel::Info, " [ INFO ] ", Style::new().blue().bold(), msg);
    }

    pub fn skipped(&self, msg: &str) {
        self.emit(LogLevel::Info, " [ SKIP ] ", Style::new().yellow().bold(), msg);
    }

    /// Section header between two rules.
    pub fn banner(&self, msg: &str) {
        if !self.level.allows(LogLevel::Info) {
            return;
        }
        self.line("");
        self.line(RULE);
        self.info(msg);
        self.line(RULE);
    }

    fn emit(&self, level: LogLevel, tag: &str, tag_style: Style, msg: &str) {
        if let Some(line) = self.format(level, tag, tag_style, msg) {
            self.line(&line);
        }
    }

    fn format(&self, level: LogLevel, tag: &str, tag_style: Style, msg: &str) -> Option<String> {
        self.level
            .allows(level)
            .then(|| format!("{}{}", tag_style.apply_to(tag), msg))
    }

    fn line(&self, text: &str) {
        if self.to_stderr {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

impl ProgressObserver for Console {
    fn block_started(&mut self, block: Block) {
        self.banner(block.title());
    }

    fn step_started(&mut self, step: &Step) {
        self.info(&format!("{}: {}", step.label, style(step.command.render()).dim()));
    }

    fn step_finished(&mut self, step: &Step, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Succeeded { .. } => self.success(&step.label),
            StepOutcome::Skipped { reason } => {
                self.skipped(&format!("{} ({})", step.label, reason))
            }
            StepOutcome::Failed { exit_code, message } => {
                let status = exit_code
                    .map(|c| format!("exit {}", c))
                    .unwrap_or_else(|| "not started".to_string());
                self.error(&format!("{} failed ({})", step.label, status));
                for line in message.lines() {
                    self.error(&format!("    {}", line));
                }
            }
        }
    }
}
