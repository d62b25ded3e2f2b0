//! Tests for sequential plan execution against a recording runner.

mod support;

use vainstall_core::mode::{InstallMode, Invocation};
use vainstall_core::plan::env::PROFILE_MARKER;
use vainstall_core::plan::{Block, build_plan};
use vainstall_core::report::StepOutcome;
use vainstall_core::sequencer::{Sequencer, SilentObserver};
use vainstall_core::types::FailurePolicy;

use support::{RecordingRunner, Sandbox};

fn run_mode(
    sandbox: &Sandbox,
    mode: &InstallMode,
    runner: RecordingRunner,
    policy: FailurePolicy,
) -> (vainstall_core::report::ProvisionReport, RecordingRunner) {
    let plan = build_plan(mode, &sandbox.ctx).unwrap();
    let mut sequencer = Sequencer::new(runner, policy);
    let report = sequencer.run(&plan, &mut SilentObserver);
    (report, sequencer.into_runner())
}

#[test]
fn zero_arguments_runs_full_install() {
    let sandbox = Sandbox::new();
    let args: Vec<String> = Vec::new();
    let Invocation::Run(mode) = Invocation::parse(&args).unwrap() else {
        panic!("expected a run invocation");
    };

    let (report, runner) = run_mode(
        &sandbox,
        &mode,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );

    assert_eq!(report.mode, "all");
    assert_eq!(runner.clone_count(), 7, "firmware plus six sources");
    assert_eq!(report.failed_count(), 0);
    assert!(!report.aborted);
}

#[test]
fn nomsdk_never_invokes_msdk_commands() {
    let sandbox = Sandbox::new();
    let (report, runner) = run_mode(
        &sandbox,
        &InstallMode::NoMsdk,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );

    assert_eq!(runner.clone_count(), 0);
    assert!(runner.commands.iter().all(|c| !c.contains("MediaSDK")));
    assert!(runner.commands.iter().all(|c| !c.contains("autogen.sh")));
    assert!(runner.commands.iter().all(|c| !c.contains("dmc_ver1")));
    assert!(report.steps.iter().all(|s| !s.block.requires_msdk()));
}

#[test]
fn existing_checkouts_are_not_recloned() {
    let sandbox = Sandbox::new();
    for dir in [
        "linux-firmware",
        "libva",
        "libva-utils",
        "media-driver",
        "gmmlib",
        "MediaSDK",
        "tbb",
    ] {
        std::fs::create_dir_all(sandbox.work().join(dir)).unwrap();
    }

    let (report, runner) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );

    assert_eq!(runner.clone_count(), 0);
    let skipped_clones = report
        .steps
        .iter()
        .filter(|s| s.label.starts_with("clone"))
        .filter(|s| matches!(s.outcome, StepOutcome::Skipped { .. }))
        .count();
    assert_eq!(skipped_clones, 7);
}

#[test]
fn second_run_issues_no_duplicate_clones() {
    let sandbox = Sandbox::new();

    let (_, first) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );
    assert_eq!(first.clone_count(), 7);

    let (_, second) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );
    assert_eq!(second.clone_count(), 0);
}

#[test]
fn present_archive_is_not_downloaded_again() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.work().join("l_openvino_toolkit_p_2018.4.420.tgz"),
        b"archive",
    )
    .unwrap();

    let (_, runner) = run_mode(
        &sandbox,
        &InstallMode::NoMsdk,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );

    assert!(runner.commands.iter().all(|c| !c.contains("curl")));
    assert!(runner.commands.iter().any(|c| c.contains("install.sh")));
}

#[test]
fn failed_download_leaves_no_archive_and_is_retried() {
    let sandbox = Sandbox::new();
    let archive = sandbox.work().join("l_openvino_toolkit_p_2018.4.420.tgz");

    let (report, _) = run_mode(
        &sandbox,
        &InstallMode::NoMsdk,
        RecordingRunner::failing_on("curl"),
        FailurePolicy::Abort,
    );
    assert!(report.aborted);
    let last = report.steps.last().unwrap();
    assert_eq!(last.label, "download l_openvino_toolkit_p_2018.4.420");
    assert!(matches!(last.outcome, StepOutcome::Failed { .. }));
    assert!(!archive.exists());

    let (report, runner) = run_mode(
        &sandbox,
        &InstallMode::NoMsdk,
        RecordingRunner::new(),
        FailurePolicy::Abort,
    );
    assert!(runner.commands.iter().any(|c| c.contains("curl -f")));
    assert!(!report.aborted);
    assert!(archive.exists());
}

#[test]
fn continue_policy_runs_past_failures() {
    let sandbox = Sandbox::new();
    let plan_len = build_plan(&InstallMode::All, &sandbox.ctx).unwrap().len();

    let (report, runner) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::failing_on("autogen.sh"),
        FailurePolicy::Continue,
    );

    assert_eq!(report.failed_count(), 2, "libva and libva-utils");
    assert_eq!(report.steps.len(), plan_len);
    assert!(!report.aborted);
    assert!(runner.commands.iter().any(|c| c.contains("dpkg -i")));
}

#[test]
fn abort_policy_stops_at_first_failure() {
    let sandbox = Sandbox::new();
    let (report, runner) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::failing_on("autogen.sh"),
        FailurePolicy::Abort,
    );

    assert!(report.aborted);
    assert_eq!(report.failed_count(), 1);
    let last = report.steps.last().unwrap();
    assert_eq!(last.label, "build libva");
    assert_eq!(last.block, Block::Libva);
    assert!(runner.commands.iter().all(|c| !c.contains("dpkg -i")));
    match &last.outcome {
        StepOutcome::Failed { exit_code, message } => {
            assert_eq!(*exit_code, Some(1));
            assert!(message.contains("simulated failure"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn configured_profile_is_left_alone() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.profile(),
        format!("export PATH=$PATH:/opt/bin\n{}\n", PROFILE_MARKER),
    )
    .unwrap();

    let (report, runner) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );

    let exports = report
        .steps
        .iter()
        .find(|s| s.label == "export profile variables")
        .unwrap();
    assert!(matches!(exports.outcome, StepOutcome::Skipped { .. }));
    assert!(runner.commands.iter().all(|c| !c.contains("LIBVA_DRIVER_NAME")));
}

#[test]
fn stale_mediasdk_install_is_removed_only_when_present() {
    let sandbox = Sandbox::new();
    let (_, runner) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );
    assert!(runner.commands.iter().all(|c| !c.starts_with("rm -rf")));

    std::fs::create_dir_all(sandbox.ctx.mediasdk_prefix()).unwrap();
    let (_, runner) = run_mode(
        &sandbox,
        &InstallMode::All,
        RecordingRunner::new(),
        FailurePolicy::Continue,
    );
    assert!(runner.commands.iter().any(|c| c.starts_with("rm -rf")));
}
