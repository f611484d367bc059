//! Workflow resolution
//!
//! A work item's workflow is never stored on the item itself; it is derived
//! through the item's entity type. Resolution is a pure lookup over the object
//! graph the caller already loaded.

use crate::error::EngineError;
use crate::work_item::WorkItem;
use std::sync::Arc;
use wfs_model::{EntityType, Workflow};

/// Finds the workflow governing a work item
pub trait WorkflowResolver {
    /// Resolve the workflow for an entity type
    ///
    /// # Errors
    /// - [`EngineError::MissingConfiguration`] if the type or its workflow is absent
    /// - [`EngineError::CompanyMismatch`] if the type and workflow belong to different companies
    fn resolve_type(&self, entity_type: Option<&EntityType>) -> Result<Arc<Workflow>, EngineError>;

    /// Resolve the workflow for a work item
    ///
    /// # Errors
    /// Same as [`WorkflowResolver::resolve_type`]
    fn resolve<W: WorkItem + ?Sized>(&self, item: &W) -> Result<Arc<Workflow>, EngineError> {
        self.resolve_type(item.entity_type())
    }
}

/// Default resolver: follows the entity type's workflow reference
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTypeResolver;

impl WorkflowResolver for EntityTypeResolver {
    fn resolve_type(&self, entity_type: Option<&EntityType>) -> Result<Arc<Workflow>, EngineError> {
        let entity_type = entity_type.ok_or_else(EngineError::missing_entity_type)?;
        let workflow = entity_type
            .workflow()
            .ok_or_else(|| EngineError::missing_workflow(entity_type.name.as_str()))?;
        entity_type
            .check_tenancy()
            .map_err(|e| EngineError::CompanyMismatch(e.to_string()))?;
        Ok(Arc::clone(workflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfs_model::{CompanyId, WorkItemCategory};

    #[test]
    fn resolves_type_workflow() {
        let company = CompanyId::new();
        let workflow = Arc::new(Workflow::new("Bugs", company));
        let bug = EntityType::new("Bug", company, WorkItemCategory::Issue).with_workflow(workflow.clone());

        let resolved = EntityTypeResolver.resolve_type(Some(&bug)).unwrap();
        assert!(Arc::ptr_eq(&resolved, &workflow));
    }

    #[test]
    fn missing_type_is_configuration_error() {
        let err = EntityTypeResolver.resolve_type(None).unwrap_err();
        assert_eq!(err, EngineError::missing_entity_type());
        assert!(err.is_configuration_error());
    }

    #[test]
    fn missing_workflow_is_configuration_error() {
        let bug = EntityType::new("Bug", CompanyId::new(), WorkItemCategory::Issue);
        let err = EntityTypeResolver.resolve_type(Some(&bug)).unwrap_err();
        assert_eq!(err, EngineError::missing_workflow("Bug"));
    }

    #[test]
    fn cross_tenant_workflow_rejected() {
        let foreign = Arc::new(Workflow::new("Foreign", CompanyId::new()));
        let bug = EntityType::new("Bug", CompanyId::new(), WorkItemCategory::Issue).with_workflow(foreign);
        assert!(matches!(
            EntityTypeResolver.resolve_type(Some(&bug)),
            Err(EngineError::CompanyMismatch(_))
        ));
    }
}
