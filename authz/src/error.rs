//! Error types for the authorization policy.
//!
//! Expected denials are reported as values or as the `Unauthenticated`,
//! `Forbidden` and `LastAdmin` variants. The transport layer decides how they
//! surface; messages here stay free of policy internals.

use thiserror::Error;

use crate::types::AdminAction;

#[derive(Debug, Error)]
pub enum AuthzError {
    /// No principal was supplied with the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// The principal lacks the role or ownership the action needs.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The action would leave the forum without an active admin.
    #[error("Cannot {0} the last active admin")]
    LastAdmin(AdminAction),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Failed to parse the Cedar policy set.
    #[error("Policy parsing failed: {0}")]
    PolicyParse(String),

    /// Failed to build Cedar entities from the request facts.
    #[error("Entity creation failed: {0}")]
    EntityCreation(String),

    #[error("Authorization evaluation failed: {0}")]
    EvaluationError(String),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
