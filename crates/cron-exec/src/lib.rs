//! Deadline-bound execution of the supervised command.
//!
//! [`Executor::execute`] never returns an error: spawn failures, deadline expiry
//! and cancellation all resolve into an [`ExecOutcome`] carrying a
//! [`cron_model::RunStatus`] and [`cron_model::ExitCode`].
mod classify;
pub use classify::{OsErrorClassifier, SpawnClassifier, SpawnFailure};

mod subprocess;
pub use subprocess::{ExecOutcome, Executor, execute};
