//! Error types for the model layer
//!
//! Raised while assembling workflows, before any engine call happens.

use crate::ids::CompanyId;

/// Invalid workflow configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A status, workflow or type belongs to another company
    #[error("{what} belongs to company {found}, expected {expected}")]
    CompanyMismatch {
        /// What was being attached
        what: String,
        /// Company of the owning record
        expected: CompanyId,
        /// Company of the attached record
        found: CompanyId,
    },

    /// `from` and `to` are the same status
    #[error("from status and to status cannot be the same: {status} -> {status}")]
    SelfTransition {
        /// Status name
        status: String,
    },

    /// The `(from, to)` edge is already defined
    #[error("status transition {from} -> {to} is already defined in workflow '{workflow}'")]
    DuplicateTransition {
        /// Workflow name
        workflow: String,
        /// Source status name, `(new)` for initial rules
        from: String,
        /// Target status name
        to: String,
    },

    /// `initial` flag disagrees with the presence of a source status
    #[error("transition {from} -> {to}: initial flag must be set exactly when there is no from status")]
    InitialFlagMismatch {
        /// Source status name, `(new)` for initial rules
        from: String,
        /// Target status name
        to: String,
    },

    /// The `(from, to)` edge is not defined
    #[error("status transition {from} -> {to} does not exist in workflow '{workflow}'")]
    UnknownTransition {
        /// Workflow name
        workflow: String,
        /// Source status name, `(new)` for initial rules
        from: String,
        /// Target status name
        to: String,
    },

    /// Workflow cannot produce an initial status
    #[error("workflow '{workflow}' has no initial transition")]
    NoInitialTransition {
        /// Workflow name
        workflow: String,
    },

    /// Unrecognized work item category name
    #[error("unknown work item category: '{0}'")]
    UnknownCategory(String),
}

impl ModelError {
    /// Create company mismatch error
    pub fn company_mismatch(what: impl Into<String>, expected: CompanyId, found: CompanyId) -> Self {
        Self::CompanyMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}
