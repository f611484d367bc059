//! Entity types and work item categories

use crate::error::ModelError;
use crate::ids::{CompanyId, EntityTypeId};
use crate::workflow::Workflow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Category of work item a type (and therefore a workflow) applies to
///
/// Each category has its own list of entity types per company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemCategory {
    /// Project activities
    Activity,
    /// Issues and bugs
    Issue,
    /// Meetings
    Meeting,
    /// Decisions
    Decision,
    /// Test cases
    TestCase,
    /// Validation cases
    ValidationCase,
    /// Tracked assets
    Asset,
    /// Storage locations and items
    StorageItem,
}

impl WorkItemCategory {
    /// All categories
    pub const ALL: [WorkItemCategory; 8] = [
        Self::Activity,
        Self::Issue,
        Self::Meeting,
        Self::Decision,
        Self::TestCase,
        Self::ValidationCase,
        Self::Asset,
        Self::StorageItem,
    ];

    /// Stable snake_case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Issue => "issue",
            Self::Meeting => "meeting",
            Self::Decision => "decision",
            Self::TestCase => "test_case",
            Self::ValidationCase => "validation_case",
            Self::Asset => "asset",
            Self::StorageItem => "storage_item",
        }
    }
}

impl fmt::Display for WorkItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkItemCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownCategory(s.to_string()))
    }
}

/// User-configurable classifier that selects the workflow of a work item
///
/// The workflow reference is optional only because stored data can be
/// misconfigured; the engine refuses to work with a type that has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    /// Unique id
    pub id: EntityTypeId,
    /// Display name ("Bug", "Improvement")
    pub name: String,
    /// Owning company
    pub company: CompanyId,
    /// Category of work item this type classifies
    pub category: WorkItemCategory,
    /// Governing workflow snapshot
    pub workflow: Option<Arc<Workflow>>,
}

impl EntityType {
    /// Create a type without a workflow
    #[must_use]
    pub fn new(name: impl Into<String>, company: CompanyId, category: WorkItemCategory) -> Self {
        Self {
            id: EntityTypeId::new(),
            name: name.into(),
            company,
            category,
            workflow: None,
        }
    }

    /// With governing workflow
    #[inline]
    #[must_use]
    pub fn with_workflow(mut self, workflow: Arc<Workflow>) -> Self {
        self.workflow = Some(workflow);
        self
    }

    /// Governing workflow, if configured
    #[inline]
    #[must_use]
    pub fn workflow(&self) -> Option<&Arc<Workflow>> {
        self.workflow.as_ref()
    }

    /// Check that the workflow belongs to the same company
    ///
    /// A type without a workflow passes; absence is reported elsewhere.
    ///
    /// # Errors
    /// [`ModelError::CompanyMismatch`] for a cross-tenant reference
    pub fn check_tenancy(&self) -> Result<(), ModelError> {
        match &self.workflow {
            Some(workflow) if workflow.company() != self.company => Err(ModelError::company_mismatch(
                format!("workflow '{}' of type '{}'", workflow.name(), self.name),
                self.company,
                workflow.company(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_loosely() {
        assert_eq!("issue".parse::<WorkItemCategory>().unwrap(), WorkItemCategory::Issue);
        assert_eq!(
            "Test-Case".parse::<WorkItemCategory>().unwrap(),
            WorkItemCategory::TestCase
        );
        assert_eq!(
            "storage item".parse::<WorkItemCategory>().unwrap(),
            WorkItemCategory::StorageItem
        );
        assert!(matches!(
            "ticket".parse::<WorkItemCategory>(),
            Err(ModelError::UnknownCategory(_))
        ));
    }

    #[test]
    fn category_serde_matches_as_str() {
        for category in WorkItemCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn tenancy_check() {
        let company = CompanyId::new();
        let own = Arc::new(Workflow::new("Own", company));
        let foreign = Arc::new(Workflow::new("Foreign", CompanyId::new()));

        let bug = EntityType::new("Bug", company, WorkItemCategory::Issue);
        assert!(bug.check_tenancy().is_ok());
        assert!(bug.clone().with_workflow(own).check_tenancy().is_ok());
        assert!(matches!(
            bug.with_workflow(foreign).check_tenancy(),
            Err(ModelError::CompanyMismatch { .. })
        ));
    }
}
