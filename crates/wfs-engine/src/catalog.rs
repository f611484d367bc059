//! Type catalog
//!
//! The catalog answers one question during initialization: which entity types
//! may a new work item of this category use in this company, in what order.
//! The first type returned becomes the item's default.

use std::sync::Arc;
use wfs_model::{CompanyId, EntityType, WorkItemCategory};

/// Source of entity types, ordered as the catalog defines them
pub trait TypeCatalog {
    /// Entity types of `category` owned by `company`, in catalog order
    fn list_types_for_company(&self, company: CompanyId, category: WorkItemCategory) -> Vec<EntityType>;
}

impl TypeCatalog for [EntityType] {
    fn list_types_for_company(&self, company: CompanyId, category: WorkItemCategory) -> Vec<EntityType> {
        self.iter()
            .filter(|entity_type| entity_type.company == company && entity_type.category == category)
            .cloned()
            .collect()
    }
}

impl TypeCatalog for Vec<EntityType> {
    fn list_types_for_company(&self, company: CompanyId, category: WorkItemCategory) -> Vec<EntityType> {
        self.as_slice().list_types_for_company(company, category)
    }
}

impl<T: TypeCatalog + ?Sized> TypeCatalog for &T {
    fn list_types_for_company(&self, company: CompanyId, category: WorkItemCategory) -> Vec<EntityType> {
        (**self).list_types_for_company(company, category)
    }
}

impl<T: TypeCatalog + ?Sized> TypeCatalog for Arc<T> {
    fn list_types_for_company(&self, company: CompanyId, category: WorkItemCategory) -> Vec<EntityType> {
        (**self).list_types_for_company(company, category)
    }
}
