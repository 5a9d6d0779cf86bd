use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("No arguments provided. Nothing to do. Run 'help' for usage.")]
    EmptyCommand,

    #[error("invalid namespace: {0:?}")]
    InvalidNamespace(String),

    #[error("invalid metric prefix: {0:?}")]
    InvalidPrefix(String),

    #[error("unknown run status: {0}")]
    UnknownStatus(String),

    #[error("run record is already finalized")]
    RecordFinalized,

    #[error("code table {table} is not injective: {detail}")]
    AmbiguousCodeTable { table: &'static str, detail: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
