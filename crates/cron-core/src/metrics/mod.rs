//! Metrics emission seam.
//!
//! The controller only knows [`MetricsSink`]; the textfile exposition writer
//! lives in `cron-prometheus` and is injected at construction time.
mod backend;
pub use backend::{MetricsHandle, MetricsSink};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
