//! Canonical run-status and exit-code tables.
mod exit;
pub use exit::ExitCode;

mod status;
pub use status::RunStatus;

use std::collections::HashSet;

use crate::ModelError;

/// Check that both code tables map codes to names one-to-one.
///
/// Run once at startup; a failure means the tables were edited inconsistently.
pub fn validate_code_tables() -> Result<(), ModelError> {
    check_injective(
        "run_status",
        RunStatus::ALL.iter().map(|s| (i64::from(s.code()), s.as_label())),
    )?;
    check_injective(
        "exit_code",
        ExitCode::NAMED.iter().map(|(c, name)| (i64::from(c.value()), *name)),
    )
}

fn check_injective<'a>(
    table: &'static str,
    entries: impl Iterator<Item = (i64, &'a str)>,
) -> Result<(), ModelError> {
    let mut codes = HashSet::new();
    let mut names = HashSet::new();
    for (code, name) in entries {
        if !codes.insert(code) {
            return Err(ModelError::AmbiguousCodeTable {
                table,
                detail: format!("duplicate code {code}"),
            });
        }
        if !names.insert(name) {
            return Err(ModelError::AmbiguousCodeTable {
                table,
                detail: format!("duplicate name {name:?}"),
            });
        }
    }
    Ok(())
}
