use std::fmt;

use serde::{Deserialize, Serialize};

/// Exit code of the supervised command, POSIX shell conventions.
///
/// Any integer is representable; the values in [`ExitCode::NAMED`] carry a
/// name and get their own one-hot metric. `-1` means no exit status could be
/// determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const UNKNOWN: ExitCode = ExitCode(-1);
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAIL_GENERIC: ExitCode = ExitCode(1);
    pub const PERM_DENIED: ExitCode = ExitCode(126);
    pub const EXEC_NOT_FOUND: ExitCode = ExitCode(127);
    pub const SIG_INT: ExitCode = ExitCode(130);
    pub const SIG_TERM: ExitCode = ExitCode(143);

    /// Named exit codes and their metric label values.
    pub const NAMED: [(ExitCode, &'static str); 7] = [
        (ExitCode::UNKNOWN, "unknown"),
        (ExitCode::SUCCESS, "success"),
        (ExitCode::FAIL_GENERIC, "fail_generic"),
        (ExitCode::PERM_DENIED, "perm_denied"),
        (ExitCode::EXEC_NOT_FOUND, "exec_not_found"),
        (ExitCode::SIG_INT, "sig_int"),
        (ExitCode::SIG_TERM, "sig_term"),
    ];

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Exit code of a process killed by `signal` (`128 + signal`).
    pub const fn from_signal(signal: i32) -> Self {
        Self(128 + signal)
    }

    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Label value for named codes, `None` for everything else.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, name)| *name)
    }

    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Value usable as this program's own process exit status.
    ///
    /// Codes outside `0..=255` (including `-1`) collapse to `1`.
    pub fn as_process_code(self) -> u8 {
        u8::try_from(self.0).unwrap_or(1)
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
