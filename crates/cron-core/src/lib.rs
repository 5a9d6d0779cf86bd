//! Run controller for a single supervised command.
//!
//! [`Runner`] derives the namespace, races the executor against termination
//! signals, finalizes the [`cron_model::RunRecord`] and hands it to a
//! [`MetricsSink`].
mod config;
pub use config::{DEFAULT_METRICS_DIR, DEFAULT_TIMEOUT_SECS, ExitCodePolicy, RunnerConfig};

mod error;
pub use error::{ConfigError, CoreError, MetricsError};

mod metrics;
pub use metrics::{MetricsHandle, MetricsSink, NoOpMetrics, noop_metrics};

mod runner;
pub use runner::{RunPhase, Runner};

mod signal;
pub use signal::{SignalListener, TerminationSignal};

pub mod prelude {
    pub use crate::{CoreError, MetricsSink, Runner, RunnerConfig};
    pub use cron_model::{ExitCode, RunRecord, RunStatus};
}
