use crate::ModelError;
use crate::domain::namespace::is_valid;

/// Normalize a configured metric-name prefix.
///
/// Blank input means "no prefix". Anything else is lowercased and gets a `_`
/// separator appended, so `MyApp` becomes `myapp_`. The result must itself
/// start a valid metric name; `my-app`, `1team` or `team.prod` are rejected
/// with [`ModelError::InvalidPrefix`].
pub fn metric_prefix(configured: Option<&str>) -> Result<Option<String>, ModelError> {
    let Some(trimmed) = configured.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let prefix = format!("{}_", trimmed.to_lowercase());
    if !is_valid(&prefix) {
        return Err(ModelError::InvalidPrefix(trimmed.to_string()));
    }
    Ok(Some(prefix))
}
