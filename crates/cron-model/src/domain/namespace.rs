//! Namespace derivation.
//!
//! A namespace names the metrics file (`cron_<namespace>_metrics.prom`) and is
//! attached to every sample as the `namespace` label, so it must satisfy the
//! Prometheus name pattern `^[a-zA-Z_:][a-zA-Z0-9_:]*$`.
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::ModelError;
use crate::domain::FALLBACK_NAMESPACE_PREFIX;

/// Characters rewritten to `_` before validation.
const REPLACED: &[char] = &[
    '.', ' ', '-', '/', '\\', ':', ';', ',', '=', '(', ')', '[', ']', '{', '}', '<', '>', '|', '?',
    '*', '"', '\'', '`', '~', '!', '@', '#', '$', '%', '^', '&', '+',
];

/// Validated metrics namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Accept `s` as-is if it matches the namespace pattern.
    pub fn parse(s: impl Into<String>) -> Result<Self, ModelError> {
        let s = s.into();
        if is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(ModelError::InvalidNamespace(s))
        }
    }

    /// Derive a namespace from configuration or, when that is empty, from the command.
    ///
    /// Never fails: input that still does not match the pattern after
    /// sanitizing is replaced by a random `randomid_<uuid>` namespace. Such runs
    /// lose continuity with earlier runs of the same command.
    pub fn derive(configured: &str, args: &[String]) -> Self {
        let seed = if configured.is_empty() {
            args.join("_")
        } else {
            configured.to_string()
        };

        Self::parse(sanitize(&seed)).unwrap_or_else(|err| {
            let fallback = Self::random();
            warn!(%err, namespace = %fallback, "invalid namespace: generated a randomid");
            fallback
        })
    }

    /// Fresh `randomid_<uuid>` namespace.
    pub fn random() -> Self {
        Self(format!(
            "{FALLBACK_NAMESPACE_PREFIX}{}",
            Uuid::new_v4().simple()
        ))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derive the namespace for a run.
///
/// See [`Namespace::derive`].
pub fn derive_namespace(configured: &str, args: &[String]) -> Namespace {
    Namespace::derive(configured, args)
}

/// Replace reserved characters with `_` (adjacent replacements are kept),
/// trim `_` on both ends, then lowercase.
fn sanitize(seed: &str) -> String {
    let replaced: String = seed
        .chars()
        .map(|c| if REPLACED.contains(&c) { '_' } else { c })
        .collect();
    replaced.trim_matches('_').to_lowercase()
}

/// Matches `^[a-zA-Z_:][a-zA-Z0-9_:]*$`.
pub(crate) fn is_valid(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == ':') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}
