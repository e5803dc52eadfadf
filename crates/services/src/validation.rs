//! Presence checks shared by the services.

use domains::{DomainError, DomainResult};

/// Rejects blank values. The value itself is kept as submitted.
pub fn require(field: &'static str, value: String) -> DomainResult<String> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} is required")));
    }
    Ok(value)
}
