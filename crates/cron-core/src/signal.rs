//! Observation of the external termination signals that end a run early.
use std::{fmt, future, io};

use cron_model::ExitCode;

/// Signal that terminated the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// SIGINT.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGHUP.
    Hangup,
}

impl TerminationSignal {
    /// Exit code recorded for a run ended by this signal.
    pub const fn exit_code(self) -> ExitCode {
        match self {
            TerminationSignal::Interrupt => ExitCode::SIG_INT,
            TerminationSignal::Terminate => ExitCode::SIG_TERM,
            TerminationSignal::Hangup => ExitCode::UNKNOWN,
        }
    }

    #[inline]
    pub const fn as_label(self) -> &'static str {
        match self {
            TerminationSignal::Interrupt => "SIGINT",
            TerminationSignal::Terminate => "SIGTERM",
            TerminationSignal::Hangup => "SIGHUP",
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Registered handlers for the termination signal set.
///
/// Must be installed inside a tokio runtime. Once installed, the default
/// disposition of these signals is replaced for the rest of the process.
#[cfg(unix)]
#[derive(Debug)]
pub struct SignalListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalListener {
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the next signal of the set.
    pub async fn recv(&mut self) -> TerminationSignal {
        tokio::select! {
            Some(()) = self.interrupt.recv() => TerminationSignal::Interrupt,
            Some(()) = self.terminate.recv() => TerminationSignal::Terminate,
            Some(()) = self.hangup.recv() => TerminationSignal::Hangup,
            else => future::pending().await,
        }
    }
}

#[cfg(not(unix))]
#[derive(Debug)]
pub struct SignalListener;

#[cfg(not(unix))]
impl SignalListener {
    pub fn install() -> io::Result<Self> {
        Ok(Self)
    }

    pub async fn recv(&mut self) -> TerminationSignal {
        match tokio::signal::ctrl_c().await {
            Ok(()) => TerminationSignal::Interrupt,
            Err(_) => future::pending().await,
        }
    }
}
