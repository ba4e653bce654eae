//! Validation helpers for DTOs.

use std::collections::BTreeMap;

use uuid::Uuid;
use validator::ValidationError;

/// Upper bound on selections accepted in one submission.
pub const MAX_SELECTIONS: usize = 512;

/// Validates that a submission carries between 1 and [`MAX_SELECTIONS`] picks.
pub fn validate_selection_count(selections: &BTreeMap<Uuid, Uuid>) -> Result<(), ValidationError> {
    if selections.is_empty() {
        let mut err = ValidationError::new("selections_empty");
        err.message = Some("at least one selection is required".into());
        return Err(err);
    }

    if selections.len() > MAX_SELECTIONS {
        let mut err = ValidationError::new("selections_too_many");
        err.message = Some(
            format!(
                "at most {MAX_SELECTIONS} selections can be submitted at once (got {})",
                selections.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}
