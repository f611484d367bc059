//! End-to-end lifecycle scenarios

use pretty_assertions::assert_eq;
use std::sync::Arc;
use wfs_engine::{
    EngineConfig, EngineError, MissingConfiguration, PickerOrder, StatusEngine, TransitionOutcome, TypeCatalog,
    WorkItem,
};
use wfs_model::{CompanyId, EntityType, Status, TransitionRule, WorkItemCategory, Workflow};
use wfs_test_utils::{
    bug_and_improvement_registry, developer, manager, two_initial_catalog, Issue, LinearFixture, Meeting, TestCase,
};

fn names(statuses: &[Status]) -> Vec<&str> {
    statuses.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn new_item_starts_in_initial_status() {
    let f = LinearFixture::new();
    let engine = StatusEngine::new();
    let mut issue = Issue::new("login fails");

    let status = engine.initialize(&mut issue, f.company, &f.catalog()).unwrap();

    assert_eq!(status, f.open);
    assert_eq!(issue.status(), Some(&f.open));
    assert_eq!(issue.entity_type().map(|t| t.name.as_str()), Some("Bug"));
    assert_eq!(names(&engine.valid_next_statuses(&issue, None).unwrap()), vec!["IN_PROGRESS"]);
    assert!(!engine.validate_transition(&issue, &f.done, None).unwrap());
    assert!(engine.validate_transition(&issue, &f.in_progress, None).unwrap());
}

#[test]
fn terminal_status_only_allows_itself() {
    let f = LinearFixture::new();
    let engine = StatusEngine::new();
    let issue = f.issue_in(&f.done);

    assert!(engine.valid_next_statuses(&issue, None).unwrap().is_empty());
    assert!(!engine.validate_transition(&issue, &f.open, None).unwrap());
    assert!(engine.validate_transition(&issue, &f.done, None).unwrap());
}

#[test]
fn first_catalog_type_wins() {
    let (registry, company) = bug_and_improvement_registry();
    let engine = StatusEngine::new();
    let mut issue = Issue::new("crash on save");

    let status = engine.initialize(&mut issue, company, &registry).unwrap();

    assert_eq!(status.name, "NEW");
    assert_eq!(issue.entity_type().map(|t| t.name.as_str()), Some("Bug"));
}

#[test]
fn first_declared_initial_rule_wins() {
    let (company, types, triaged, backlog) = two_initial_catalog();
    let engine = StatusEngine::new();
    let mut issue = Issue::new("intake");

    assert_eq!(engine.initialize(&mut issue, company, &types).unwrap(), triaged);

    // both initial statuses remain candidates for an uninitialized item
    let mut typed = Issue::new("typed but new");
    typed.set_entity_type(types[0].clone());
    assert_eq!(
        engine.valid_next_statuses(&typed, None).unwrap(),
        vec![triaged.clone(), backlog]
    );
}

#[test]
fn initialization_is_deterministic() {
    let (company, types, triaged, _) = two_initial_catalog();
    let engine = StatusEngine::new();
    for _ in 0..5 {
        let mut issue = Issue::new("again");
        assert_eq!(engine.initialize(&mut issue, company, &types).unwrap(), triaged);
    }
}

#[test]
fn empty_workflow_fails_initialization_without_writing() {
    let company = CompanyId::new();
    let types = vec![EntityType::new("Empty", company, WorkItemCategory::Meeting)
        .with_workflow(Arc::new(Workflow::new("Nothing", company)))];
    let engine = StatusEngine::new();
    let mut meeting = Meeting::new("standup");

    let err = engine.initialize(&mut meeting, company, &types).unwrap_err();

    assert_eq!(
        err,
        EngineError::NoInitialStatus {
            workflow: "Nothing".into()
        }
    );
    assert!(err.is_configuration_error());
    assert!(meeting.status().is_none());
    assert!(meeting.entity_type().is_none());
}

#[test]
fn no_types_for_category() {
    let f = LinearFixture::new();
    let engine = StatusEngine::new();
    let mut test_case = TestCase::new("checkout");

    let err = engine
        .initialize(&mut test_case, f.company, &f.catalog())
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::NoTypesConfigured {
            company: f.company,
            category: WorkItemCategory::TestCase
        }
    );
    assert!(test_case.status().is_none());
}

#[test]
fn type_without_workflow_is_missing_configuration() {
    let company = CompanyId::new();
    let types = vec![EntityType::new("Orphan", company, WorkItemCategory::Issue)];
    let engine = StatusEngine::new();
    let mut issue = Issue::new("orphan");

    let err = engine.initialize(&mut issue, company, &types).unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingConfiguration(MissingConfiguration::Workflow {
            entity_type: "Orphan".into()
        })
    );
    assert!(issue.entity_type().is_none());
}

#[test]
fn item_without_type_cannot_list_statuses() {
    let engine = StatusEngine::new();
    let issue = Issue::new("untyped");
    assert_eq!(
        engine.valid_next_statuses(&issue, None).unwrap_err(),
        EngineError::missing_entity_type()
    );
}

#[test]
fn role_restricted_edge() {
    let company = CompanyId::new();
    let open = Status::new("OPEN", company);
    let closed = Status::new("CLOSED", company);
    let workflow = Workflow::new("Guarded", company)
        .with_rule(TransitionRule::initial(open.clone()))
        .and_then(|w| w.with_rule(TransitionRule::between(open.clone(), closed.clone()).restricted_to("MANAGER")))
        .unwrap();
    let bug = EntityType::new("Bug", company, WorkItemCategory::Issue).with_workflow(Arc::new(workflow));
    let issue = Issue::restored("guarded", bug, open);
    let engine = StatusEngine::new();

    assert!(engine.validate_transition(&issue, &closed, Some(&manager())).unwrap());
    assert!(!engine.validate_transition(&issue, &closed, Some(&developer())).unwrap());
    assert!(!engine.validate_transition(&issue, &closed, None).unwrap());
}

#[test]
fn apply_transition_walks_the_workflow() {
    let f = LinearFixture::new();
    let engine = StatusEngine::new();
    let mut issue = f.issue_in(&f.open);

    let err = engine.apply_transition(&mut issue, f.done.clone(), None).unwrap_err();
    assert!(matches!(err, EngineError::IllegalTransition { .. }));
    assert!(err.is_recoverable());
    assert_eq!(issue.status(), Some(&f.open));

    assert_eq!(
        engine.apply_transition(&mut issue, f.in_progress.clone(), None).unwrap(),
        TransitionOutcome::Changed {
            from: Some(f.open.clone()),
            to: f.in_progress.clone()
        }
    );
    assert!(engine
        .apply_transition(&mut issue, f.done.clone(), None)
        .unwrap()
        .is_changed());
    assert_eq!(
        engine.apply_transition(&mut issue, f.done.clone(), None).unwrap(),
        TransitionOutcome::Unchanged
    );
}

#[test]
fn picker_lists_current_status_first() {
    let company = CompanyId::new();
    let open = Status::new("OPEN", company).with_sort_order(1);
    let later = Status::new("LATER", company).with_sort_order(9);
    let soon = Status::new("SOON", company).with_sort_order(5);
    let workflow = Workflow::new("Picker", company)
        .with_rule(TransitionRule::initial(open.clone()))
        .and_then(|w| w.with_rule(TransitionRule::between(open.clone(), later.clone())))
        .and_then(|w| w.with_rule(TransitionRule::between(open.clone(), soon.clone())))
        .unwrap();
    let bug = EntityType::new("Bug", company, WorkItemCategory::Issue).with_workflow(Arc::new(workflow));
    let issue = Issue::restored("picker", bug, open);

    let declared = StatusEngine::new().selectable_statuses(&issue, None).unwrap();
    assert_eq!(names(&declared), vec!["OPEN", "LATER", "SOON"]);

    let sorted = StatusEngine::new()
        .with_config(EngineConfig::new().with_picker_order(PickerOrder::SortOrder))
        .selectable_statuses(&issue, None)
        .unwrap();
    assert_eq!(names(&sorted), vec!["OPEN", "SOON", "LATER"]);
}

#[test]
fn workflow_edits_apply_to_existing_items() {
    let (registry, company) = bug_and_improvement_registry();
    let engine = StatusEngine::new();
    let mut issue = Issue::new("evolving");
    let new = engine.initialize(&mut issue, company, &registry).unwrap();

    let triage = Status::new("TRIAGE", company);
    registry.add_status(triage.clone()).unwrap();
    let bugs = registry.find_workflow(company, "Bugs").unwrap();
    registry
        .add_transition(bugs.id(), TransitionRule::between(new, triage.clone()))
        .unwrap();

    // the item still holds the old snapshot; reloading its type picks up the edit
    assert!(engine.valid_next_statuses(&issue, None).unwrap().is_empty());
    let bug = registry
        .list_types_for_company(company, WorkItemCategory::Issue)
        .into_iter()
        .next()
        .unwrap();
    issue.set_entity_type(bug);
    assert_eq!(engine.valid_next_statuses(&issue, None).unwrap(), vec![triage]);
}
