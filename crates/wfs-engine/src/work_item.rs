//! Work item capability
//!
//! Every work item (issue, meeting, test case, asset, ...) embeds a
//! [`Lifecycle`] and implements [`WorkItem`] by pointing at it. The engine is
//! written once against the trait and never sees concrete types.
//!
//! The lifecycle is the only place a status is written, so the null-status
//! guard cannot be skipped by an individual implementation.

use crate::error::NullStatusViolation;
use std::sync::Arc;
use wfs_model::{EntityType, Status, WorkItemCategory, Workflow};

/// Type and status slots of a work item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lifecycle {
    entity_type: Option<EntityType>,
    status: Option<Status>,
}

impl Lifecycle {
    /// Uninitialized lifecycle for a freshly constructed item
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle of an item loaded from storage
    #[must_use]
    pub fn restored(entity_type: EntityType, status: Status) -> Self {
        Self {
            entity_type: Some(entity_type),
            status: Some(status),
        }
    }

    /// Lifecycle from untrusted input (bulk import, cloning from a record)
    ///
    /// # Errors
    /// [`NullStatusViolation`] if `status` is absent
    pub fn import(
        entity_type: Option<EntityType>,
        status: Option<Status>,
    ) -> Result<Self, NullStatusViolation> {
        let mut lifecycle = Self {
            entity_type,
            status: None,
        };
        lifecycle.set_status(status)?;
        Ok(lifecycle)
    }

    /// Current entity type
    #[inline]
    #[must_use]
    pub fn entity_type(&self) -> Option<&EntityType> {
        self.entity_type.as_ref()
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Whether a status has been assigned
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.status.is_some()
    }

    /// Replace the entity type
    pub fn set_entity_type(&mut self, entity_type: EntityType) {
        self.entity_type = Some(entity_type);
    }

    /// Replace the status
    ///
    /// The argument is checked before anything is written.
    ///
    /// # Errors
    /// [`NullStatusViolation`] if `status` is `None`; the lifecycle is unchanged
    pub fn set_status(&mut self, status: Option<Status>) -> Result<(), NullStatusViolation> {
        let Some(status) = status else {
            return Err(null_status_violation(self.status.as_ref()));
        };
        self.status = Some(status);
        Ok(())
    }
}

fn null_status_violation(current: Option<&Status>) -> NullStatusViolation {
    tracing::error!(
        current = current.map(|s| s.name.as_str()),
        "attempt to set work item status to null"
    );

    #[cfg(feature = "strict-debug")]
    panic!("work item status set to null (current: {current:?})");

    #[cfg(not(feature = "strict-debug"))]
    NullStatusViolation
}

/// Capability shared by every entity that participates in a status lifecycle
pub trait WorkItem {
    /// Category used to pick entity types from the catalog
    fn category(&self) -> WorkItemCategory;

    /// Embedded lifecycle
    fn lifecycle(&self) -> &Lifecycle;

    /// Embedded lifecycle, mutable
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Current entity type
    fn entity_type(&self) -> Option<&EntityType> {
        self.lifecycle().entity_type()
    }

    /// Replace the entity type
    fn set_entity_type(&mut self, entity_type: EntityType) {
        self.lifecycle_mut().set_entity_type(entity_type);
    }

    /// Current status
    fn status(&self) -> Option<&Status> {
        self.lifecycle().status()
    }

    /// Replace the status, rejecting `None`
    ///
    /// # Errors
    /// [`NullStatusViolation`] if `status` is `None`
    fn set_status(&mut self, status: Option<Status>) -> Result<(), NullStatusViolation> {
        self.lifecycle_mut().set_status(status)
    }

    /// Workflow of the current entity type
    fn workflow(&self) -> Option<&Arc<Workflow>> {
        self.entity_type().and_then(EntityType::workflow)
    }
}
