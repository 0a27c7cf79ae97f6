use std::collections::BTreeMap;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Field-keyed validation messages, surfaced to the client as a map.
    #[error("Validation failed for {} field(s)", .0.len())]
    InvalidFields(BTreeMap<String, String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Generic 401 used for every authentication failure so callers cannot
    /// distinguish "no session" from "unknown account".
    pub fn unauthorized() -> Self {
        CoreError::Unauthorized("Unauthorized".into())
    }

    /// Generic 403 for non-administrators hitting admin endpoints.
    pub fn admin_required() -> Self {
        CoreError::Forbidden("Admin access required".into())
    }
}
