//! Spawn-failure classification.
//!
//! Best effort: the OS reports spawn failures as `io::Error`, and the mapping
//! to shell exit codes (126/127) depends on error kinds, errno values and, as a
//! last resort, message text. Anything unrecognized is [`SpawnFailure::Unknown`].
use std::io;

use cron_model::ExitCode;

/// Why a command could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnFailure {
    /// Executable does not exist (exit code 127).
    NotFound,
    /// Executable exists but cannot be executed (exit code 126).
    PermissionDenied,
    /// Anything else (exit code -1).
    Unknown,
}

impl SpawnFailure {
    pub const fn exit_code(self) -> ExitCode {
        match self {
            SpawnFailure::NotFound => ExitCode::EXEC_NOT_FOUND,
            SpawnFailure::PermissionDenied => ExitCode::PERM_DENIED,
            SpawnFailure::Unknown => ExitCode::UNKNOWN,
        }
    }

    #[inline]
    pub const fn as_label(self) -> &'static str {
        match self {
            SpawnFailure::NotFound => "not_found",
            SpawnFailure::PermissionDenied => "permission_denied",
            SpawnFailure::Unknown => "unknown",
        }
    }
}

/// Maps a spawn error to a [`SpawnFailure`].
pub trait SpawnClassifier: Send + Sync + 'static {
    fn classify(&self, err: &io::Error) -> SpawnFailure;
}

/// Default classifier: error kind, then errno, then message text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsErrorClassifier;

impl SpawnClassifier for OsErrorClassifier {
    fn classify(&self, err: &io::Error) -> SpawnFailure {
        by_kind(err.kind())
            .or_else(|| err.raw_os_error().and_then(by_errno))
            .or_else(|| by_message(&err.to_string()))
            .unwrap_or(SpawnFailure::Unknown)
    }
}

fn by_kind(kind: io::ErrorKind) -> Option<SpawnFailure> {
    match kind {
        io::ErrorKind::NotFound => Some(SpawnFailure::NotFound),
        io::ErrorKind::PermissionDenied => Some(SpawnFailure::PermissionDenied),
        _ => None,
    }
}

#[cfg(unix)]
fn by_errno(errno: i32) -> Option<SpawnFailure> {
    match errno {
        libc::ENOENT | libc::ENOTDIR => Some(SpawnFailure::NotFound),
        libc::EACCES | libc::EPERM | libc::ENOEXEC | libc::EISDIR => {
            Some(SpawnFailure::PermissionDenied)
        }
        _ => None,
    }
}

#[cfg(not(unix))]
fn by_errno(_errno: i32) -> Option<SpawnFailure> {
    None
}

fn by_message(msg: &str) -> Option<SpawnFailure> {
    let msg = msg.to_ascii_lowercase();
    if msg.contains("not found") || msg.contains("no such file") {
        Some(SpawnFailure::NotFound)
    } else if msg.contains("permission denied") {
        Some(SpawnFailure::PermissionDenied)
    } else {
        None
    }
}
