//! Testing utilities for WFS workspace
//!
//! Work item types, workflow fixtures and role helpers shared by the
//! integration tests.

#![allow(missing_docs)]

use std::sync::Arc;
use wfs_engine::{Lifecycle, WorkItem, WorkflowRegistry};
use wfs_model::{CompanyId, EntityType, Role, Status, TransitionRule, WorkItemCategory, Workflow};

macro_rules! work_item {
    ($name:ident, $category:expr) => {
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            pub title: String,
            pub lifecycle: Lifecycle,
        }

        impl $name {
            pub fn new(title: &str) -> Self {
                Self {
                    title: title.to_string(),
                    lifecycle: Lifecycle::new(),
                }
            }

            /// Item loaded from storage with type and status already set
            pub fn restored(title: &str, entity_type: EntityType, status: Status) -> Self {
                Self {
                    title: title.to_string(),
                    lifecycle: Lifecycle::restored(entity_type, status),
                }
            }
        }

        impl WorkItem for $name {
            fn category(&self) -> WorkItemCategory {
                $category
            }

            fn lifecycle(&self) -> &Lifecycle {
                &self.lifecycle
            }

            fn lifecycle_mut(&mut self) -> &mut Lifecycle {
                &mut self.lifecycle
            }
        }
    };
}

work_item!(Issue, WorkItemCategory::Issue);
work_item!(Meeting, WorkItemCategory::Meeting);
work_item!(TestCase, WorkItemCategory::TestCase);

pub fn manager() -> Role {
    Role::new("MANAGER")
}

pub fn developer() -> Role {
    Role::new("DEVELOPER")
}

/// `null -> OPEN (initial), OPEN -> IN_PROGRESS, IN_PROGRESS -> DONE`
/// with a single "Bug" issue type
#[derive(Debug, Clone)]
pub struct LinearFixture {
    pub company: CompanyId,
    pub open: Status,
    pub in_progress: Status,
    pub done: Status,
    pub workflow: Arc<Workflow>,
    pub bug: EntityType,
}

impl LinearFixture {
    pub fn new() -> Self {
        let company = CompanyId::new();
        let open = Status::new("OPEN", company).with_sort_order(1);
        let in_progress = Status::new("IN_PROGRESS", company).with_sort_order(2);
        let done = Status::new("DONE", company).with_sort_order(3);

        let workflow = Workflow::new("Linear", company)
            .with_rule(TransitionRule::initial(open.clone()))
            .and_then(|w| w.with_rule(TransitionRule::between(open.clone(), in_progress.clone())))
            .and_then(|w| w.with_rule(TransitionRule::between(in_progress.clone(), done.clone())))
            .unwrap();
        let workflow = Arc::new(workflow);
        let bug = EntityType::new("Bug", company, WorkItemCategory::Issue).with_workflow(Arc::clone(&workflow));

        Self {
            company,
            open,
            in_progress,
            done,
            workflow,
            bug,
        }
    }

    pub fn catalog(&self) -> Vec<EntityType> {
        vec![self.bug.clone()]
    }

    /// Issue of type "Bug" currently in `status`
    pub fn issue_in(&self, status: &Status) -> Issue {
        Issue::restored("fixture", self.bug.clone(), status.clone())
    }
}

impl Default for LinearFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Workflow with two initial rules, `TRIAGED` declared before `BACKLOG`
pub fn two_initial_catalog() -> (CompanyId, Vec<EntityType>, Status, Status) {
    let company = CompanyId::new();
    let triaged = Status::new("TRIAGED", company);
    let backlog = Status::new("BACKLOG", company);
    let workflow = Workflow::new("Intake", company)
        .with_rule(TransitionRule::initial(triaged.clone()))
        .and_then(|w| w.with_rule(TransitionRule::initial(backlog.clone())))
        .unwrap();
    let types = vec![EntityType::new("Request", company, WorkItemCategory::Issue).with_workflow(Arc::new(workflow))];
    (company, types, triaged, backlog)
}

/// Registry with "Bug" then "Improvement" issue types on different workflows
///
/// Bug starts in `NEW`, Improvement starts in `PROPOSED`.
pub fn bug_and_improvement_registry() -> (WorkflowRegistry, CompanyId) {
    let registry = WorkflowRegistry::new();
    let company = CompanyId::new();
    let new = Status::new("NEW", company);
    let proposed = Status::new("PROPOSED", company);
    registry.add_status(new.clone()).unwrap();
    registry.add_status(proposed.clone()).unwrap();

    let bugs = registry
        .add_workflow(Workflow::new("Bugs", company).with_rule(TransitionRule::initial(new)).unwrap())
        .unwrap();
    let ideas = registry
        .add_workflow(
            Workflow::new("Ideas", company)
                .with_rule(TransitionRule::initial(proposed))
                .unwrap(),
        )
        .unwrap();

    registry
        .add_entity_type("Bug", company, WorkItemCategory::Issue, bugs)
        .unwrap();
    registry
        .add_entity_type("Improvement", company, WorkItemCategory::Issue, ideas)
        .unwrap();
    (registry, company)
}
