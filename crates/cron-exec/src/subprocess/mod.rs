//! Child process spawning, waiting and teardown.
mod executor;
pub use executor::{Executor, execute};

mod outcome;
pub use outcome::ExecOutcome;

mod teardown;
