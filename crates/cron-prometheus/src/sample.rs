use std::fmt;

use cron_model::Labels;

/// Prometheus metric type of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Counter,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        })
    }
}

/// One named, typed, labeled integer sample.
///
/// Samples sharing a name form one metric family and must agree on help text,
/// type and label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    pub name: String,
    pub help: String,
    pub kind: MetricType,
    pub value: i64,
    pub labels: Labels,
}

impl MetricSample {
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind: MetricType::Gauge,
            value,
            labels: Labels::new(),
        }
    }

    pub fn counter(name: impl Into<String>, help: impl Into<String>, value: i64) -> Self {
        Self {
            kind: MetricType::Counter,
            ..Self::gauge(name, help, value)
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key, value);
        self
    }
}
