use std::process::ExitStatus;

use cron_model::{ExitCode, RunStatus};

use crate::SpawnFailure;

/// Result of one [`crate::Executor::execute`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub exit_code: ExitCode,
    pub status: RunStatus,
    /// OS pid of the child, `None` if it never started.
    pub pid: Option<u32>,
}

impl ExecOutcome {
    /// Child ran to completion: `Success` iff it exited with code 0.
    pub(crate) fn exited(status: ExitStatus, pid: Option<u32>) -> Self {
        let exit_code = exit_code_of(status);
        Self {
            exit_code,
            status: if exit_code.is_success() {
                RunStatus::Success
            } else {
                RunStatus::Fail
            },
            pid,
        }
    }

    pub(crate) fn spawn_failed(failure: SpawnFailure) -> Self {
        Self {
            exit_code: failure.exit_code(),
            status: RunStatus::Fail,
            pid: None,
        }
    }

    /// Deadline elapsed; there is no real exit status, so report a generic failure.
    pub(crate) fn timed_out(pid: Option<u32>) -> Self {
        Self {
            exit_code: ExitCode::FAIL_GENERIC,
            status: RunStatus::Timeout,
            pid,
        }
    }

    pub(crate) fn cancelled(pid: Option<u32>) -> Self {
        Self {
            exit_code: ExitCode::UNKNOWN,
            status: RunStatus::Terminated,
            pid,
        }
    }

    pub(crate) fn wait_failed(pid: Option<u32>) -> Self {
        Self {
            exit_code: ExitCode::UNKNOWN,
            status: RunStatus::Fail,
            pid,
        }
    }
}

/// Exit code of a finished child; killed-by-signal maps to `128 + signal`.
fn exit_code_of(status: ExitStatus) -> ExitCode {
    if let Some(code) = status.code() {
        return ExitCode::new(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitCode::from_signal(signal);
        }
    }
    ExitCode::UNKNOWN
}
