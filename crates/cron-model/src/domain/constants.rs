//! Well-known string constants shared by the deriver and the exposition layer.

/// Label attached to every emitted sample, carrying the run namespace.
pub const LABEL_NAMESPACE: &str = "namespace";

/// Prefix of the namespace generated when a derived one fails validation.
///
/// The rest of the value is a simple (hyphen-free) UUID, so the generated
/// namespace still satisfies the metric-name pattern.
pub const FALLBACK_NAMESPACE_PREFIX: &str = "randomid_";
