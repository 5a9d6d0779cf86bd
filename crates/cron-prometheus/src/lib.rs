//! Prometheus textfile exposition for cron runs.
//!
//! This crate provides [`TextfileMetrics`], a [`cron_core::MetricsSink`] that
//! renders the samples of a finalized run in the Prometheus text format and
//! writes them to `<dir>/cron_<namespace>_metrics.prom` for the node_exporter
//! textfile collector.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use cron_core::{Runner, RunnerConfig};
//! use cron_prometheus::TextfileMetrics;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunnerConfig::default();
//! let metrics = Arc::new(TextfileMetrics::new(&config.metrics_dir));
//! let mut runner = Runner::new(vec!["echo".into(), "hello".into()], config, metrics)?;
//! runner.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! Every sample carries a `namespace` label; names get the configured prefix.
//! - `cron_start_time_seconds`, `cron_end_time_seconds` - epoch seconds
//! - `cron_status_code`, `cron_exit_code` - numeric outcome
//! - `cron_duration_milliseconds`, `cron_timeout_seconds`, `cron_dryrun`
//! - `cron_status{code, status}` - one-hot over every run status
//! - `cron_exit{code, exit}` - one-hot over every named exit code
mod backend;
pub use backend::TextfileMetrics;

mod exposition;
pub use exposition::render;

mod sample;
pub use sample::{MetricSample, MetricType};

mod standard;
pub use standard::run_samples;

mod textfile;
pub use textfile::TextfileWriter;
