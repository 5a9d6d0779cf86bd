use std::sync::Arc;

use cron_model::RunRecord;

use crate::MetricsError;

/// Destination for the metrics of a finalized run.
pub trait MetricsSink: Send + Sync + 'static {
    /// Publish the state of `record`, replacing whatever a previous run of the
    /// same namespace published.
    ///
    /// Called exactly once per run, after the record is finalized.
    fn publish(&self, record: &RunRecord) -> Result<(), MetricsError>;
}

/// Shared handle to a metrics sink.
pub type MetricsHandle = Arc<dyn MetricsSink>;
