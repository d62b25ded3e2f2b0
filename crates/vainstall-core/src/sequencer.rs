//! Sequential plan execution.

use tracing::{debug, error, info, warn};

use crate::plan::{Block, Plan, Step};
use crate::report::{ProvisionReport, StepOutcome, StepRecord, output_tail};
use crate::runner::CommandRunner;
use crate::types::FailurePolicy;

/// Hooks for frontends that want to show progress as steps run.
pub trait ProgressObserver {
    fn block_started(&mut self, _block: Block) {}
    fn step_started(&mut self, _step: &Step) {}
    fn step_finished(&mut self, _step: &Step, _outcome: &StepOutcome) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default)]
pub struct SilentObserver;

impl ProgressObserver for SilentObserver {}

/// Runs plan steps one after another, blocking on each.
#[derive(Debug)]
pub struct Sequencer<R: CommandRunner> {
    runner: R,
    policy: FailurePolicy,
}

impl<R: CommandRunner> Sequencer<R> {
    pub fn new(runner: R, policy: FailurePolicy) -> Self {
        Self { runner, policy }
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Execute every step of `plan` in order.
    ///
    /// Under [`FailurePolicy::Continue`] a failed step is recorded and the
    /// next one runs. Under [`FailurePolicy::Abort`] the run stops and the
    /// report is marked aborted.
    pub fn run(&mut self, plan: &Plan, observer: &mut dyn ProgressObserver) -> ProvisionReport {
        let mut report = ProvisionReport::new(plan.mode().describe());
        let mut current_block = None;

        info!(mode = %plan.mode().describe(), steps = plan.len(), "Starting provisioning");

        for step in plan.steps() {
            if current_block != Some(step.block) {
                current_block = Some(step.block);
                observer.block_started(step.block);
            }

            observer.step_started(step);
            let outcome = self.execute(step);
            observer.step_finished(step, &outcome);

            let failed = outcome.is_failure();
            report.steps.push(StepRecord {
                label: step.label.clone(),
                block: step.block,
                command: step.command.render(),
                outcome,
            });

            if failed && self.policy == FailurePolicy::Abort {
                error!(step = %step.label, "Aborting after failed step");
                report.aborted = true;
                break;
            }
        }

        report.finished_at = chrono::Utc::now();
        info!(
            succeeded = report.succeeded_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Provisioning finished"
        );
        report
    }

    fn execute(&mut self, step: &Step) -> StepOutcome {
        if let Some(reason) = step.guard.as_ref().and_then(|g| g.skip_reason()) {
            info!(step = %step.label, %reason, "Skipping step");
            return StepOutcome::Skipped { reason };
        }

        info!(step = %step.label, "Running step");
        debug!(command = %step.command.render());

        match self.runner.run(&step.command) {
            Ok(output) => {
                if !output.output.is_empty() {
                    debug!(step = %step.label, output = %output.output);
                }
                if output.success() {
                    StepOutcome::Succeeded {
                        exit_code: output.status,
                    }
                } else {
                    warn!(step = %step.label, status = ?output.status, "Step failed");
                    StepOutcome::Failed {
                        exit_code: output.status,
                        message: output_tail(&output.output),
                    }
                }
            }
            Err(err) => {
                warn!(step = %step.label, error = %err, "Step could not start");
                StepOutcome::Failed {
                    exit_code: None,
                    message: format!("{:#}", err),
                }
            }
        }
    }
}
