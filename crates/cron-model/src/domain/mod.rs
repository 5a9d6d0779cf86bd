mod command;
pub use command::CommandLine;

mod namespace;
pub use namespace::{Namespace, derive_namespace};

mod prefix;
pub use prefix::metric_prefix;

mod labels;
pub use labels::Labels;

mod constants;
pub use constants::{FALLBACK_NAMESPACE_PREFIX, LABEL_NAMESPACE};
