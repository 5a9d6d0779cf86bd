use std::{io, path::PathBuf};

use thiserror::Error;

use cron_model::ModelError;

use crate::runner::RunPhase;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("run already started (phase: {0})")]
    AlreadyStarted(RunPhase),

    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer for {key}: {value:?}")]
    InvalidInteger { key: &'static str, value: String },

    #[error("invalid boolean for {key}: {value:?} (expected: true|false)")]
    InvalidBool { key: &'static str, value: String },

    #[error("invalid value for {key}: {value:?} (expected: {expected})")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to encode metrics: {0}")]
    Encode(String),

    #[error("failed to write metrics file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
