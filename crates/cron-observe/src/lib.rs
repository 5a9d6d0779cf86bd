//! Logging setup for the cron runner.
//!
//! Logs always go to standard error: standard output is shared with the
//! supervised command.
mod logger;
pub use logger::*;
