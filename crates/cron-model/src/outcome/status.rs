use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Lifecycle status of a run.
///
/// `Unknown` and `Running` are transient; every finalized run carries exactly
/// one of the terminal values (`Success`, `Fail`, `Timeout`, `Terminated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Unknown,
    Running,
    Success,
    Fail,
    Timeout,
    Terminated,
}

impl RunStatus {
    /// Every status, in code order of the one-hot metric family.
    pub const ALL: [RunStatus; 6] = [
        RunStatus::Unknown,
        RunStatus::Success,
        RunStatus::Fail,
        RunStatus::Timeout,
        RunStatus::Terminated,
        RunStatus::Running,
    ];

    /// Numeric code exported as `cron_status_code`.
    pub const fn code(self) -> i32 {
        match self {
            RunStatus::Unknown => -1,
            RunStatus::Success => 0,
            RunStatus::Fail => 1,
            RunStatus::Timeout => 2,
            RunStatus::Terminated => 3,
            RunStatus::Running => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    #[inline]
    pub const fn as_label(self) -> &'static str {
        match self {
            RunStatus::Unknown => "unknown",
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Fail => "fail",
            RunStatus::Timeout => "timeout",
            RunStatus::Terminated => "terminated",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Fail | RunStatus::Timeout | RunStatus::Terminated
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for RunStatus {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|st| st.as_label() == norm)
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_exported_values() {
        assert_eq!(RunStatus::Unknown.code(), -1);
        assert_eq!(RunStatus::Success.code(), 0);
        assert_eq!(RunStatus::Fail.code(), 1);
        assert_eq!(RunStatus::Timeout.code(), 2);
        assert_eq!(RunStatus::Terminated.code(), 3);
        assert_eq!(RunStatus::Running.code(), 4);
    }

    #[test]
    fn code_lookup_is_inverse() {
        for status in RunStatus::ALL {
            assert_eq!(RunStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(RunStatus::from_code(42), None);
    }

    #[test]
    fn only_outcomes_are_terminal() {
        assert!(!RunStatus::Unknown.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Success.is_terminal());
        assert!(RunStatus::Terminated.is_terminal());
    }

    #[test]
    fn parses_labels_case_insensitive() {
        assert_eq!("TIMEOUT".parse::<RunStatus>().unwrap(), RunStatus::Timeout);
        assert_eq!(" fail ".parse::<RunStatus>().unwrap(), RunStatus::Fail);
        assert!("crashed".parse::<RunStatus>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&RunStatus::Terminated).unwrap();
        assert_eq!(json, r#""terminated""#);
    }
}
