//! Workflow registry
//!
//! In-memory home of the administrative configuration: statuses, workflows
//! and entity types for any number of companies. It is the write side of the
//! configuration and doubles as the [`TypeCatalog`] used at initialization.
//!
//! Workflows are stored as immutable `Arc` snapshots. Every administrative
//! change builds a new snapshot and swaps it in, so work items holding an
//! older snapshot keep a consistent view while later lookups see the change.

use crate::catalog::TypeCatalog;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use wfs_model::{
    CompanyId, EntityType, EntityTypeId, ModelError, Role, Status, StatusId, TransitionRule,
    WorkItemCategory, Workflow, WorkflowId,
};

/// Errors from administrative flows
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Status name already taken in this company
    #[error("status '{name}' already exists for company {company}")]
    DuplicateStatusName {
        /// Owning company
        company: CompanyId,
        /// Conflicting name
        name: String,
    },

    /// Entity type name already taken in this company and category
    #[error("{category} type '{name}' already exists for company {company}")]
    DuplicateTypeName {
        /// Owning company
        company: CompanyId,
        /// Category of the type
        category: WorkItemCategory,
        /// Conflicting name
        name: String,
    },

    /// Status id already registered
    #[error("status {0} is already registered")]
    DuplicateStatus(StatusId),

    /// Workflow id already registered
    #[error("workflow {0} is already registered")]
    DuplicateWorkflow(WorkflowId),

    /// Status is not registered
    #[error("status not found: {0}")]
    UnknownStatus(StatusId),

    /// Workflow is not registered
    #[error("workflow not found: {0}")]
    UnknownWorkflow(WorkflowId),

    /// Entity type is not registered
    #[error("entity type not found: {0}")]
    UnknownEntityType(EntityTypeId),

    /// Status cannot be removed while referenced
    #[error("status '{status}' is in use: {reason}")]
    StatusInUse {
        /// Status name
        status: String,
        /// What references it
        reason: String,
    },

    /// Workflow cannot be removed while an entity type references it
    #[error("workflow '{workflow}' is used by entity type '{entity_type}'")]
    WorkflowInUse {
        /// Workflow name
        workflow: String,
        /// Referencing type name
        entity_type: String,
    },

    /// Rule or tenancy violation
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Persistence-side probe for the status deletion guard
pub trait StatusUsage {
    /// Whether any live work item currently has `status`
    fn is_status_in_use(&self, status: StatusId) -> bool;
}

/// Usage probe for callers without live work items (tests, config tooling)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLiveItems;

impl StatusUsage for NoLiveItems {
    fn is_status_in_use(&self, _status: StatusId) -> bool {
        false
    }
}

impl<F: Fn(StatusId) -> bool> StatusUsage for F {
    fn is_status_in_use(&self, status: StatusId) -> bool {
        self(status)
    }
}

#[derive(Debug, Clone)]
struct TypeRecord {
    id: EntityTypeId,
    name: String,
    company: CompanyId,
    category: WorkItemCategory,
    workflow: WorkflowId,
}

#[derive(Debug, Default)]
struct RegistryState {
    statuses: IndexMap<StatusId, Status>,
    workflows: IndexMap<WorkflowId, Arc<Workflow>>,
    types: IndexMap<EntityTypeId, TypeRecord>,
}

impl RegistryState {
    fn materialize(&self, record: &TypeRecord) -> EntityType {
        EntityType {
            id: record.id,
            name: record.name.clone(),
            company: record.company,
            category: record.category,
            workflow: self.workflows.get(&record.workflow).cloned(),
        }
    }

    fn check_name_free(&self, company: CompanyId, name: &str, except: Option<StatusId>) -> Result<(), RegistryError> {
        let taken = self
            .statuses
            .values()
            .any(|s| s.company == company && s.name == name && Some(s.id) != except);
        if taken {
            return Err(RegistryError::DuplicateStatusName {
                company,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Rule with its statuses replaced by the registered records
    fn canonical_rule(&self, rule: TransitionRule) -> Result<TransitionRule, RegistryError> {
        let stored = |status: &Status| {
            self.statuses
                .get(&status.id)
                .cloned()
                .ok_or(RegistryError::UnknownStatus(status.id))
        };
        Ok(TransitionRule {
            from: rule.from.as_ref().map(stored).transpose()?,
            to: stored(&rule.to)?,
            ..rule
        })
    }

    fn update_workflow<T>(
        &mut self,
        id: WorkflowId,
        change: impl FnOnce(&mut Workflow) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let current = self.workflows.get(&id).ok_or(RegistryError::UnknownWorkflow(id))?;
        let mut next = Workflow::clone(current);
        let out = change(&mut next)?;
        self.workflows.insert(id, Arc::new(next));
        Ok(out)
    }
}

/// Thread-safe store of workflow configuration
#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    state: RwLock<RegistryState>,
}

impl WorkflowRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- statuses -------------------------------------------------------

    /// Register a status
    ///
    /// # Errors
    /// - [`RegistryError::DuplicateStatus`] if the id is registered; use
    ///   [`WorkflowRegistry::update_status`] to change it
    /// - [`RegistryError::DuplicateStatusName`] if the name is taken in the company
    pub fn add_status(&self, status: Status) -> Result<StatusId, RegistryError> {
        let mut state = self.state.write();
        if state.statuses.contains_key(&status.id) {
            return Err(RegistryError::DuplicateStatus(status.id));
        }
        state.check_name_free(status.company, &status.name, None)?;
        tracing::debug!(status = %status.name, company = %status.company, "adding status");
        let id = status.id;
        state.statuses.insert(id, status);
        Ok(id)
    }

    /// Look up a status
    #[must_use]
    pub fn status(&self, id: StatusId) -> Option<Status> {
        self.state.read().statuses.get(&id).cloned()
    }

    /// Look up a status by name
    #[must_use]
    pub fn find_status(&self, company: CompanyId, name: &str) -> Option<Status> {
        self.state
            .read()
            .statuses
            .values()
            .find(|s| s.company == company && s.name == name)
            .cloned()
    }

    /// Statuses of a company ordered by sort order, then registration order
    #[must_use]
    pub fn statuses_for_company(&self, company: CompanyId) -> Vec<Status> {
        let mut out: Vec<Status> = self
            .state
            .read()
            .statuses
            .values()
            .filter(|s| s.company == company)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.sort_order);
        out
    }

    /// Replace a status' display metadata (name, color, sort order)
    ///
    /// Every workflow that references the status is republished with the new
    /// metadata.
    ///
    /// # Errors
    /// - [`RegistryError::UnknownStatus`] if the status is not registered
    /// - [`RegistryError::DuplicateStatusName`] if the new name is taken
    /// - [`RegistryError::Model`] if the company would change
    pub fn update_status(&self, status: Status) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let existing = state
            .statuses
            .get(&status.id)
            .ok_or(RegistryError::UnknownStatus(status.id))?;
        if existing.company != status.company {
            return Err(ModelError::company_mismatch(
                format!("status '{}'", status.name),
                existing.company,
                status.company,
            )
            .into());
        }
        state.check_name_free(status.company, &status.name, Some(status.id))?;

        let affected: Vec<WorkflowId> = state
            .workflows
            .values()
            .filter(|w| w.references_status(status.id))
            .map(|w| w.id())
            .collect();
        for id in affected {
            state.update_workflow(id, |workflow| {
                workflow.refresh_status(&status);
                Ok(())
            })?;
        }

        tracing::debug!(status = %status.name, "updated status");
        state.statuses.insert(status.id, status);
        Ok(())
    }

    /// Remove a status that nothing references
    ///
    /// # Errors
    /// - [`RegistryError::UnknownStatus`] if the status is not registered
    /// - [`RegistryError::StatusInUse`] if a workflow rule references it or
    ///   `usage` reports live work items in it
    pub fn remove_status(&self, id: StatusId, usage: &dyn StatusUsage) -> Result<Status, RegistryError> {
        let mut state = self.state.write();
        let status = state.statuses.get(&id).ok_or(RegistryError::UnknownStatus(id))?;

        if let Some(workflow) = state.workflows.values().find(|w| w.references_status(id)) {
            return Err(RegistryError::StatusInUse {
                status: status.name.clone(),
                reason: format!("referenced by workflow '{}'", workflow.name()),
            });
        }
        if usage.is_status_in_use(id) {
            return Err(RegistryError::StatusInUse {
                status: status.name.clone(),
                reason: "assigned to live work items".to_string(),
            });
        }

        tracing::debug!(status = %status.name, "removing status");
        state
            .statuses
            .shift_remove(&id)
            .ok_or(RegistryError::UnknownStatus(id))
    }

    // ---- workflows ------------------------------------------------------

    /// Register a workflow; every status it references must be registered
    ///
    /// Rules are rebuilt from the registered statuses, so status copies held
    /// by the caller never reach the stored workflow.
    ///
    /// # Errors
    /// - [`RegistryError::DuplicateWorkflow`] if the id is registered
    /// - [`RegistryError::UnknownStatus`] for an unregistered status
    /// - [`RegistryError::Model`] if a registered status belongs to another company
    pub fn add_workflow(&self, workflow: Workflow) -> Result<WorkflowId, RegistryError> {
        let mut state = self.state.write();
        let id = workflow.id();
        if state.workflows.contains_key(&id) {
            return Err(RegistryError::DuplicateWorkflow(id));
        }

        let mut canonical = Workflow::with_id(id, workflow.name(), workflow.company());
        for rule in workflow.rules() {
            canonical.add_rule(state.canonical_rule(rule.clone())?)?;
        }

        tracing::debug!(workflow = canonical.name(), rules = canonical.len(), "adding workflow");
        state.workflows.insert(id, Arc::new(canonical));
        Ok(id)
    }

    /// Current snapshot of a workflow
    #[must_use]
    pub fn workflow(&self, id: WorkflowId) -> Option<Arc<Workflow>> {
        self.state.read().workflows.get(&id).cloned()
    }

    /// Look up a workflow by name
    #[must_use]
    pub fn find_workflow(&self, company: CompanyId, name: &str) -> Option<Arc<Workflow>> {
        self.state
            .read()
            .workflows
            .values()
            .find(|w| w.company() == company && w.name() == name)
            .cloned()
    }

    /// Workflows of a company in registration order
    #[must_use]
    pub fn workflows_for_company(&self, company: CompanyId) -> Vec<Arc<Workflow>> {
        self.state
            .read()
            .workflows
            .values()
            .filter(|w| w.company() == company)
            .cloned()
            .collect()
    }

    /// Remove a workflow no entity type uses
    ///
    /// # Errors
    /// - [`RegistryError::UnknownWorkflow`] if the workflow is not registered
    /// - [`RegistryError::WorkflowInUse`] if an entity type references it
    pub fn remove_workflow(&self, id: WorkflowId) -> Result<Arc<Workflow>, RegistryError> {
        let mut state = self.state.write();
        let workflow = state.workflows.get(&id).ok_or(RegistryError::UnknownWorkflow(id))?;
        if let Some(record) = state.types.values().find(|t| t.workflow == id) {
            return Err(RegistryError::WorkflowInUse {
                workflow: workflow.name().to_string(),
                entity_type: record.name.clone(),
            });
        }
        tracing::debug!(workflow = workflow.name(), "removing workflow");
        state
            .workflows
            .shift_remove(&id)
            .ok_or(RegistryError::UnknownWorkflow(id))
    }

    /// Add a transition to a workflow
    ///
    /// # Errors
    /// - [`RegistryError::UnknownWorkflow`] / [`RegistryError::UnknownStatus`]
    /// - [`RegistryError::Model`] for rule violations (duplicate, self-loop, cross-company)
    pub fn add_transition(&self, workflow: WorkflowId, rule: TransitionRule) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let rule = state.canonical_rule(rule)?;
        tracing::debug!(%workflow, rule = %rule, "adding status transition");
        state.update_workflow(workflow, |w| Ok(w.add_rule(rule)?))
    }

    /// Change the role restriction of a transition
    ///
    /// # Errors
    /// - [`RegistryError::UnknownWorkflow`]
    /// - [`RegistryError::Model`] if the transition does not exist
    pub fn update_transition_role(
        &self,
        workflow: WorkflowId,
        from: Option<StatusId>,
        to: StatusId,
        role: Option<Role>,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        tracing::debug!(%workflow, role = ?role.as_ref().map(Role::as_str), "updating status transition role");
        state.update_workflow(workflow, |w| Ok(w.set_rule_role(from, to, role)?))
    }

    /// Remove a transition from a workflow
    ///
    /// # Errors
    /// - [`RegistryError::UnknownWorkflow`]
    /// - [`RegistryError::Model`] if the transition does not exist
    pub fn remove_transition(
        &self,
        workflow: WorkflowId,
        from: Option<StatusId>,
        to: StatusId,
    ) -> Result<TransitionRule, RegistryError> {
        let mut state = self.state.write();
        state.update_workflow(workflow, |w| {
            let name = w.name().to_string();
            let from_label = from
                .and_then(|id| w.status(id))
                .map_or_else(|| "(new)".to_string(), |s| s.name.clone());
            let to_label = w
                .status(to)
                .map_or_else(|| to.to_string(), |s| s.name.clone());
            let removed = w.remove_rule(from, to).ok_or(ModelError::UnknownTransition {
                workflow: name,
                from: from_label,
                to: to_label,
            })?;
            tracing::debug!(rule = %removed, "removed status transition");
            Ok(removed)
        })
    }

    // ---- entity types ---------------------------------------------------

    /// Register an entity type; catalog order is registration order
    ///
    /// # Errors
    /// - [`RegistryError::UnknownWorkflow`] if the workflow is not registered
    /// - [`RegistryError::Model`] if the workflow belongs to another company
    /// - [`RegistryError::DuplicateTypeName`] if the name is taken
    pub fn add_entity_type(
        &self,
        name: impl Into<String>,
        company: CompanyId,
        category: WorkItemCategory,
        workflow: WorkflowId,
    ) -> Result<EntityTypeId, RegistryError> {
        let name = name.into();
        let mut state = self.state.write();
        let target = state
            .workflows
            .get(&workflow)
            .ok_or(RegistryError::UnknownWorkflow(workflow))?;
        if target.company() != company {
            return Err(ModelError::company_mismatch(
                format!("workflow '{}' of type '{name}'", target.name()),
                company,
                target.company(),
            )
            .into());
        }
        if state
            .types
            .values()
            .any(|t| t.company == company && t.category == category && t.name == name)
        {
            return Err(RegistryError::DuplicateTypeName { company, category, name });
        }

        tracing::debug!(entity_type = %name, %category, workflow = target.name(), "adding entity type");
        let id = EntityTypeId::new();
        state.types.insert(
            id,
            TypeRecord {
                id,
                name,
                company,
                category,
                workflow,
            },
        );
        Ok(id)
    }

    /// Entity type with its current workflow snapshot
    #[must_use]
    pub fn entity_type(&self, id: EntityTypeId) -> Option<EntityType> {
        let state = self.state.read();
        state.types.get(&id).map(|record| state.materialize(record))
    }

    /// Look up an entity type by name
    #[must_use]
    pub fn find_entity_type(&self, company: CompanyId, category: WorkItemCategory, name: &str) -> Option<EntityType> {
        let state = self.state.read();
        state
            .types
            .values()
            .find(|t| t.company == company && t.category == category && t.name == name)
            .map(|record| state.materialize(record))
    }

    /// Remove an entity type
    ///
    /// # Errors
    /// [`RegistryError::UnknownEntityType`] if the type is not registered
    pub fn remove_entity_type(&self, id: EntityTypeId) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let record = state
            .types
            .shift_remove(&id)
            .ok_or(RegistryError::UnknownEntityType(id))?;
        tracing::debug!(entity_type = %record.name, "removed entity type");
        Ok(())
    }
}

impl TypeCatalog for WorkflowRegistry {
    fn list_types_for_company(&self, company: CompanyId, category: WorkItemCategory) -> Vec<EntityType> {
        let state = self.state.read();
        state
            .types
            .values()
            .filter(|t| t.company == company && t.category == category)
            .map(|record| state.materialize(record))
            .collect()
    }
}
