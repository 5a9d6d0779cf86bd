use std::fmt;

use cron_model::RunStatus;

/// Lifecycle phase of a [`crate::Runner`].
///
/// `Init → Running → Finished(status) → Finalized`, or `Init → Running → DryRun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Running,
    /// Terminal outcome recorded, end time not yet stamped.
    Finished(RunStatus),
    /// Record frozen and metrics emitted (or skipped).
    Finalized,
    /// Dry run reported; nothing was spawned.
    DryRun,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Init => f.write_str("init"),
            RunPhase::Running => f.write_str("running"),
            RunPhase::Finished(status) => write!(f, "finished({status})"),
            RunPhase::Finalized => f.write_str("finalized"),
            RunPhase::DryRun => f.write_str("dry-run"),
        }
    }
}
