use std::path::PathBuf;

use tracing::debug;

use cron_core::{MetricsError, MetricsSink};
use cron_model::RunRecord;

use crate::{TextfileWriter, render, run_samples};

/// Textfile metrics backend.
///
/// Implements [`MetricsSink`] by rendering [`run_samples`] of the finalized
/// run and replacing `<dir>/cron_<namespace>_metrics.prom`, where the
/// node_exporter textfile collector picks it up.
#[derive(Debug, Clone)]
pub struct TextfileMetrics {
    writer: TextfileWriter,
}

impl TextfileMetrics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: TextfileWriter::new(dir),
        }
    }

    pub fn writer(&self) -> &TextfileWriter {
        &self.writer
    }
}

impl MetricsSink for TextfileMetrics {
    fn publish(&self, record: &RunRecord) -> Result<(), MetricsError> {
        let namespace = record
            .namespace()
            .ok_or_else(|| MetricsError::Encode("run has no namespace".into()))?;

        let text = render(namespace, record.prefix(), &run_samples(record))?;
        let path = self.writer.write(namespace, &text)?;
        debug!(path = %path.display(), %namespace, "metrics written");
        Ok(())
    }
}
