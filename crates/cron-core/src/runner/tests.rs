use std::{
    future,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use cron_model::{ExitCode, ModelError, RunRecord, RunStatus};

use super::*;
use crate::{MetricsError, MetricsSink, noop_metrics};

/// Sink that keeps every published record.
#[derive(Default)]
struct RecordingSink {
    published: Mutex<Vec<RunRecord>>,
}

impl RecordingSink {
    fn published(&self) -> Vec<RunRecord> {
        self.published.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn publish(&self, record: &RunRecord) -> Result<(), MetricsError> {
        self.published.lock().unwrap().push(record.clone());
        Ok(())
    }
}

struct FailingSink;

impl MetricsSink for FailingSink {
    fn publish(&self, _: &RunRecord) -> Result<(), MetricsError> {
        Err(MetricsError::Encode("boom".into()))
    }
}

fn args(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn config() -> RunnerConfig {
    RunnerConfig {
        timeout: Duration::from_secs(30),
        ..RunnerConfig::default()
    }
}

fn never() -> impl Future<Output = TerminationSignal> {
    future::pending()
}

async fn signal_after(delay: Duration, signal: TerminationSignal) -> TerminationSignal {
    tokio::time::sleep(delay).await;
    signal
}

#[test]
fn empty_command_is_rejected() {
    let err = Runner::new(vec![], config(), noop_metrics()).unwrap_err();
    assert!(matches!(err, CoreError::Model(ModelError::EmptyCommand)));
}

#[test]
fn invalid_prefix_is_rejected_before_running() {
    let cfg = RunnerConfig {
        metrics_prefix: Some("my-app".into()),
        ..config()
    };
    let err = Runner::new(args(&["true"]), cfg, noop_metrics()).unwrap_err();
    assert!(matches!(err, CoreError::Model(ModelError::InvalidPrefix(_))));
}

#[test]
fn new_runner_starts_in_init() {
    let runner = Runner::new(args(&["echo", "hello"]), config(), noop_metrics()).unwrap();
    assert_eq!(runner.phase(), RunPhase::Init);
    assert_eq!(runner.record().command().as_slice(), args(&["echo", "hello"]));
    assert_eq!(runner.record().status(), RunStatus::Unknown);
    assert_eq!(runner.record().exit_code(), ExitCode::UNKNOWN);
}

#[tokio::test]
async fn successful_run_is_published_once() {
    let sink = Arc::new(RecordingSink::default());
    let mut runner = Runner::new(args(&["echo", "hello"]), config(), sink.clone()).unwrap();

    runner.run_until(never()).await.unwrap();

    let record = runner.record();
    assert_eq!(runner.phase(), RunPhase::Finalized);
    assert_eq!(record.status(), RunStatus::Success);
    assert_eq!(record.exit_code(), ExitCode::SUCCESS);
    assert_eq!(record.namespace().unwrap().as_str(), "echo_hello");
    assert!(record.ended_at().is_some());

    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].status(), RunStatus::Success);
    assert!(published[0].is_finalized());
}

#[tokio::test]
async fn failing_command_sets_fail_and_end_time() {
    let mut runner = Runner::new(args(&["false"]), config(), noop_metrics()).unwrap();
    runner.run_until(never()).await.unwrap();

    assert_eq!(runner.record().status(), RunStatus::Fail);
    assert_ne!(runner.record().exit_code(), ExitCode::SUCCESS);
    assert!(runner.record().ended_at().is_some());
}

#[tokio::test]
async fn missing_executable_is_127() {
    let mut runner = Runner::new(
        args(&["invalidornonexistentcommand"]),
        config(),
        noop_metrics(),
    )
    .unwrap();
    runner.run_until(never()).await.unwrap();

    assert_eq!(runner.record().status(), RunStatus::Fail);
    assert_eq!(runner.record().exit_code(), ExitCode::EXEC_NOT_FOUND);
}

#[tokio::test]
async fn permission_denied_is_126() {
    let mut runner = Runner::new(args(&["/dev/null"]), config(), noop_metrics()).unwrap();
    runner.run_until(never()).await.unwrap();

    assert_eq!(runner.record().status(), RunStatus::Fail);
    assert_eq!(runner.record().exit_code(), ExitCode::PERM_DENIED);
}

#[tokio::test]
async fn deadline_yields_timeout() {
    let cfg = RunnerConfig {
        timeout: Duration::from_secs(1),
        ..RunnerConfig::default()
    };
    let mut runner = Runner::new(args(&["sleep", "5"]), cfg, noop_metrics()).unwrap();

    let started = Instant::now();
    runner.run_until(never()).await.unwrap();

    assert_eq!(runner.record().status(), RunStatus::Timeout);
    assert_eq!(runner.record().exit_code(), ExitCode::FAIL_GENERIC);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn duration_covers_the_command() {
    let mut runner = Runner::new(args(&["sleep", "1"]), config(), noop_metrics()).unwrap();
    runner.run_until(never()).await.unwrap();

    let ms = runner.record().duration().as_millis();
    assert!((1000..2000).contains(&ms), "unexpected duration {ms}ms");
}

#[tokio::test]
async fn interrupt_wins_the_race() {
    let mut runner = Runner::new(args(&["sleep", "5"]), config(), noop_metrics()).unwrap();

    let started = Instant::now();
    runner
        .run_until(signal_after(
            Duration::from_millis(200),
            TerminationSignal::Interrupt,
        ))
        .await
        .unwrap();

    assert_eq!(runner.record().status(), RunStatus::Terminated);
    assert_eq!(runner.record().exit_code(), ExitCode::SIG_INT);
    assert_eq!(runner.phase(), RunPhase::Finalized);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn terminate_and_hangup_map_exit_codes() {
    for (signal, expected) in [
        (TerminationSignal::Terminate, ExitCode::SIG_TERM),
        (TerminationSignal::Hangup, ExitCode::UNKNOWN),
    ] {
        let mut runner = Runner::new(args(&["sleep", "5"]), config(), noop_metrics()).unwrap();
        runner
            .run_until(signal_after(Duration::from_millis(100), signal))
            .await
            .unwrap();

        assert_eq!(runner.record().status(), RunStatus::Terminated);
        assert_eq!(runner.record().exit_code(), expected);
    }
}

#[tokio::test]
async fn configured_namespace_is_sanitized() {
    let cfg = RunnerConfig {
        namespace: "TEST-nameSPACE!@$%^&*()-=+ TEST AGAIN".into(),
        metrics_prefix: Some("Team".into()),
        ..config()
    };
    let mut runner = Runner::new(
        args(&["cat", "/tmp/does_not_exist/this/should/not/exist.txt"]),
        cfg,
        noop_metrics(),
    )
    .unwrap();
    runner.run_until(never()).await.unwrap();

    let record = runner.record();
    assert_eq!(
        record.namespace().unwrap().as_str(),
        "test_namespace_____________test_again"
    );
    assert_eq!(record.prefix(), Some("team_"));
    assert_eq!(record.status(), RunStatus::Fail);
    assert_eq!(record.exit_code(), ExitCode::FAIL_GENERIC);
}

#[tokio::test]
async fn dry_run_spawns_nothing_and_publishes_nothing() {
    let sink = Arc::new(RecordingSink::default());
    let cfg = RunnerConfig {
        dry_run: true,
        metrics_prefix: Some("team".into()),
        ..config()
    };
    let mut runner = Runner::new(args(&["echo", "hello world"]), cfg, sink.clone()).unwrap();
    runner.run_until(never()).await.unwrap();

    assert_eq!(runner.phase(), RunPhase::DryRun);
    assert!(!runner.record().status().is_terminal());
    assert!(!runner.record().is_finalized());
    assert!(sink.published().is_empty());

    assert_eq!(
        runner.dry_run_report(),
        "DRYRUN: Metric Prefix: team_\n\
         DRYRUN: Metric Namespace: echo_hello_world\n\
         DRYRUN: Args: [echo hello world]\n\
         DRYRUN: Timeout: 30\n"
    );
}

#[tokio::test]
async fn disabled_metrics_are_not_published() {
    let sink = Arc::new(RecordingSink::default());
    let cfg = RunnerConfig {
        metrics_enabled: false,
        ..config()
    };
    let mut runner = Runner::new(args(&["true"]), cfg, sink.clone()).unwrap();
    runner.run_until(never()).await.unwrap();

    assert_eq!(runner.phase(), RunPhase::Finalized);
    assert!(sink.published().is_empty());
}

#[tokio::test]
async fn metrics_failure_keeps_outcome() {
    let mut runner = Runner::new(args(&["true"]), config(), Arc::new(FailingSink)).unwrap();
    let err = runner.run_until(never()).await.unwrap_err();

    assert!(matches!(err, CoreError::Metrics(MetricsError::Encode(_))));
    assert_eq!(runner.record().status(), RunStatus::Success);
    assert_eq!(runner.record().exit_code(), ExitCode::SUCCESS);
    assert!(runner.record().is_finalized());
}

#[tokio::test]
async fn runner_cannot_be_reused() {
    let mut runner = Runner::new(args(&["true"]), config(), noop_metrics()).unwrap();
    runner.run_until(never()).await.unwrap();

    let err = runner.run_until(never()).await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyStarted(RunPhase::Finalized)));
}

/// Writer whose every write fails, like a closed stdout.
struct BrokenPipe;

impl std::io::Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::ErrorKind::BrokenPipe.into())
    }
}

#[tokio::test]
async fn dry_run_report_survives_unwritable_output() {
    let cfg = RunnerConfig {
        dry_run: true,
        ..config()
    };
    let mut runner = Runner::new(args(&["echo", "hello"]), cfg, noop_metrics()).unwrap();
    runner.run_until(never()).await.unwrap();

    let mut captured = Vec::new();
    runner.print_dry_run_report(&mut captured);
    assert_eq!(String::from_utf8(captured).unwrap(), runner.dry_run_report());

    runner.print_dry_run_report(&mut BrokenPipe);
    assert_eq!(runner.phase(), RunPhase::DryRun);
}
