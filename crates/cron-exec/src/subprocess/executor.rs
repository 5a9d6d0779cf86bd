use std::{fmt, io, process::ExitStatus, process::Stdio, sync::Arc, time::Duration};

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use cron_model::CommandLine;

use crate::subprocess::{ExecOutcome, teardown::teardown};
use crate::{OsErrorClassifier, SpawnClassifier};

/// How waiting on the child ended.
enum Waited {
    Exited(io::Result<ExitStatus>),
    DeadlineElapsed,
    Cancelled,
}

/// Spawns the supervised command and waits for it under a deadline.
#[derive(Clone)]
pub struct Executor {
    classifier: Arc<dyn SpawnClassifier>,
}

impl Executor {
    /// Executor using [`OsErrorClassifier`].
    pub fn new() -> Self {
        Self::with_classifier(Arc::new(OsErrorClassifier))
    }

    pub fn with_classifier(classifier: Arc<dyn SpawnClassifier>) -> Self {
        Self { classifier }
    }

    /// Run `command` to completion, killing it once `deadline` elapses or `cancel` fires.
    ///
    /// The child inherits stdout/stderr, reads stdin from `/dev/null` and runs
    /// in its own process group. On deadline or cancellation the whole group is
    /// killed and the child reaped before this returns.
    pub async fn execute(
        &self,
        command: &CommandLine,
        deadline: Duration,
        cancel: CancellationToken,
    ) -> ExecOutcome {
        trace!(
            program = %command.program(),
            args = ?command.args(),
            ?deadline,
            "spawning command",
        );

        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let failure = self.classifier.classify(&e);
                debug!(
                    program = %command.program(),
                    failure = failure.as_label(),
                    "spawn failed: {e}",
                );
                return ExecOutcome::spawn_failed(failure);
            }
        };
        let pid = child.id();

        let waited = tokio::select! {
            res = child.wait() => Waited::Exited(res),
            () = tokio::time::sleep(deadline) => Waited::DeadlineElapsed,
            () = cancel.cancelled() => Waited::Cancelled,
        };

        match waited {
            Waited::Exited(Ok(status)) => {
                debug!(?pid, %status, "command exited");
                ExecOutcome::exited(status, pid)
            }
            Waited::Exited(Err(e)) => {
                warn!(?pid, "waiting on command failed: {e}");
                teardown(&mut child).await;
                ExecOutcome::wait_failed(pid)
            }
            Waited::DeadlineElapsed => {
                warn!(?pid, ?deadline, "deadline exceeded; killing command");
                teardown(&mut child).await;
                ExecOutcome::timed_out(pid)
            }
            Waited::Cancelled => {
                debug!(?pid, "cancellation requested; killing command");
                teardown(&mut child).await;
                ExecOutcome::cancelled(pid)
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("classifier", &"<classifier>")
            .finish()
    }
}

/// Run `command` under `deadline` with the default executor and no external cancellation.
pub async fn execute(command: &CommandLine, deadline: Duration) -> ExecOutcome {
    Executor::new()
        .execute(command, deadline, CancellationToken::new())
        .await
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Instant;

    use cron_model::{ExitCode, RunStatus};

    use super::*;
    use crate::SpawnFailure;

    const LONG: Duration = Duration::from_secs(30);

    fn cmd(args: &[&str]) -> CommandLine {
        CommandLine::new(args.iter().copied()).unwrap()
    }

    fn is_alive(pid: u32) -> bool {
        // SAFETY: signal 0 only checks that the pid exists.
        unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let outcome = execute(&cmd(&["echo", "hello"]), LONG).await;
        assert_eq!(outcome.status, RunStatus::Success);
        assert_eq!(outcome.exit_code, ExitCode::SUCCESS);
        assert!(outcome.pid.is_some());
    }

    #[tokio::test]
    async fn false_is_failure() {
        let outcome = execute(&cmd(&["false"]), LONG).await;
        assert_eq!(outcome.status, RunStatus::Fail);
        assert_ne!(outcome.exit_code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn real_exit_code_is_reported() {
        let outcome = execute(&cmd(&["sh", "-c", "exit 3"]), LONG).await;
        assert_eq!(outcome.status, RunStatus::Fail);
        assert_eq!(outcome.exit_code.value(), 3);

        let outcome = execute(&cmd(&["test", "-f", "/tmp/does_not_exist"]), LONG).await;
        assert_eq!(outcome.exit_code, ExitCode::FAIL_GENERIC);
    }

    #[tokio::test]
    async fn missing_executable_is_127() {
        let outcome = execute(&cmd(&["invalidornonexistentcommand"]), LONG).await;
        assert_eq!(outcome.status, RunStatus::Fail);
        assert_eq!(outcome.exit_code, ExitCode::EXEC_NOT_FOUND);
        assert_eq!(outcome.pid, None);
    }

    #[tokio::test]
    async fn non_executable_target_is_126() {
        let outcome = execute(&cmd(&["/dev/null"]), LONG).await;
        assert_eq!(outcome.status, RunStatus::Fail);
        assert_eq!(outcome.exit_code, ExitCode::PERM_DENIED);
    }

    #[tokio::test]
    async fn deadline_kills_the_child() {
        let started = Instant::now();
        let outcome = execute(&cmd(&["sleep", "5"]), Duration::from_millis(200)).await;

        assert_eq!(outcome.status, RunStatus::Timeout);
        assert_eq!(outcome.exit_code, ExitCode::FAIL_GENERIC);
        assert!(started.elapsed() < Duration::from_secs(4));

        let pid = outcome.pid.expect("child was spawned");
        assert!(!is_alive(pid), "child {pid} still running after timeout");
    }

    /// Process state letter from `/proc/<pid>/stat`, `None` once the pid is gone.
    #[cfg(target_os = "linux")]
    fn proc_state(pid: u32) -> Option<char> {
        let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        stat.rsplit_once(')')?.1.trim_start().chars().next()
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn deadline_kills_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = dir.path().join("grandchild.pid");
        let script = r#"sleep 30 & echo $! > "$1"; wait"#;
        let command = cmd(&["sh", "-c", script, "sh", pidfile.to_str().unwrap()]);

        let outcome = execute(&command, Duration::from_millis(500)).await;
        assert_eq!(outcome.status, RunStatus::Timeout);

        let grandchild: u32 = std::fs::read_to_string(&pidfile)
            .unwrap()
            .trim()
            .parse()
            .unwrap();

        // Signal delivery is asynchronous; give the kernel a moment.
        let mut state = proc_state(grandchild);
        for _ in 0..50 {
            if matches!(state, None | Some('Z')) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            state = proc_state(grandchild);
        }
        assert!(
            matches!(state, None | Some('Z')),
            "grandchild {grandchild} survived teardown in state {state:?}"
        );
    }

    #[tokio::test]
    async fn cancellation_kills_the_child() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let outcome = Executor::new()
            .execute(&cmd(&["sleep", "5"]), LONG, cancel)
            .await;

        assert_eq!(outcome.status, RunStatus::Terminated);
        assert_eq!(outcome.exit_code, ExitCode::UNKNOWN);
        assert!(!is_alive(outcome.pid.expect("child was spawned")));
    }

    #[tokio::test]
    async fn custom_classifier_is_used() {
        struct AlwaysUnknown;
        impl SpawnClassifier for AlwaysUnknown {
            fn classify(&self, _: &io::Error) -> SpawnFailure {
                SpawnFailure::Unknown
            }
        }

        let executor = Executor::with_classifier(Arc::new(AlwaysUnknown));
        let outcome = executor
            .execute(
                &cmd(&["invalidornonexistentcommand"]),
                LONG,
                CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.status, RunStatus::Fail);
        assert_eq!(outcome.exit_code, ExitCode::UNKNOWN);
    }
}
