mod domain;
pub use domain::{CommandLine, Labels, Namespace, derive_namespace, metric_prefix};
pub use domain::{FALLBACK_NAMESPACE_PREFIX, LABEL_NAMESPACE};

mod error;
pub use error::{ModelError, ModelResult};

mod outcome;
pub use outcome::{ExitCode, RunStatus, validate_code_tables};

mod record;
pub use record::{RunRecord, Stamp};
