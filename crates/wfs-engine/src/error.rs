//! Error types for the status engine
//!
//! Three families of failure leave the engine:
//! - configuration errors (missing type/workflow, no types, no initial status,
//!   cross-tenant references): administrator misconfiguration, abort the
//!   surrounding create operation
//! - illegal transitions: expected, user-facing, recoverable
//! - programming errors (null status, double initialization): caller bugs

use wfs_model::{CompanyId, WorkItemCategory};

/// What configuration was missing when the engine needed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingConfiguration {
    /// The work item has no entity type
    EntityType,
    /// The entity type references no workflow
    Workflow {
        /// Name of the misconfigured type
        entity_type: String,
    },
}

impl std::fmt::Display for MissingConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityType => write!(f, "work item has no entity type"),
            Self::Workflow { entity_type } => {
                write!(f, "entity type '{entity_type}' has no workflow")
            }
        }
    }
}

/// Attempt to clear the status of a work item
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status of a work item must not be set to null")]
pub struct NullStatusViolation;

/// Main engine error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Entity type or workflow reference is absent
    #[error("missing configuration: {0}")]
    MissingConfiguration(MissingConfiguration),

    /// No entity types for this company and category
    #[error("no {category} types configured for company {company}")]
    NoTypesConfigured {
        /// Owning company
        company: CompanyId,
        /// Work item category being initialized
        category: WorkItemCategory,
    },

    /// Workflow has no initial transition
    #[error("workflow '{workflow}' defines no initial status")]
    NoInitialStatus {
        /// Workflow name
        workflow: String,
    },

    /// Type, workflow or status belong to different companies
    #[error("cross-company reference: {0}")]
    CompanyMismatch(String),

    /// `initialize` called on an item that already has a status
    #[error("work item is already initialized with status '{status}'")]
    AlreadyInitialized {
        /// Current status name
        status: String,
    },

    /// Requested status change is not allowed by the workflow
    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition {
        /// Current status name, `(new)` when uninitialized
        from: String,
        /// Requested status name
        to: String,
    },

    /// Null-status guard fired
    #[error(transparent)]
    NullStatus(#[from] NullStatusViolation),
}

impl EngineError {
    /// Create missing entity type error
    #[inline]
    #[must_use]
    pub fn missing_entity_type() -> Self {
        Self::MissingConfiguration(MissingConfiguration::EntityType)
    }

    /// Create missing workflow error
    #[inline]
    pub fn missing_workflow(entity_type: impl Into<String>) -> Self {
        Self::MissingConfiguration(MissingConfiguration::Workflow {
            entity_type: entity_type.into(),
        })
    }

    /// Administrator misconfiguration; aborts creation, surfaces as an internal failure
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConfiguration(_)
                | Self::NoTypesConfigured { .. }
                | Self::NoInitialStatus { .. }
                | Self::CompanyMismatch(_)
        )
    }

    /// Caller bug; never user-triggerable
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::NullStatus(_) | Self::AlreadyInitialized { .. })
    }

    /// Expected outcome the user can act on
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }
}
