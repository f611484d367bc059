//! Status engine
//!
//! Decides two things for any work item:
//! 1. Which status it starts in ([`StatusEngine::initialize`])
//! 2. Whether a requested status change is legal ([`StatusEngine::validate_transition`])
//!
//! The engine is stateless between calls. It reads the workflow snapshot the
//! item's entity type points at, never caches it, and never writes anything
//! except through [`WorkItem::set_entity_type`] / [`WorkItem::set_status`].

use crate::catalog::TypeCatalog;
use crate::config::{EngineConfig, PickerOrder};
use crate::error::EngineError;
use crate::resolver::{EntityTypeResolver, WorkflowResolver};
use crate::work_item::WorkItem;
use std::collections::HashSet;
use wfs_model::{CompanyId, Role, Status, StatusId, Workflow};

const NEW_LABEL: &str = "(new)";

/// Result of [`StatusEngine::apply_transition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Requested status equals the current one; nothing was written
    Unchanged,
    /// Status was written
    Changed {
        /// Previous status (`None` only for uninitialized items)
        from: Option<Status>,
        /// New status
        to: Status,
    },
}

impl TransitionOutcome {
    /// Whether the item was modified
    #[inline]
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Statuses reachable from `current` in `workflow`
///
/// - `current == None`: targets of the initial rules; roles are not consulted
/// - otherwise: targets of rules leaving `current` that `role` may take
///
/// Declaration order, de-duplicated by first occurrence, never contains
/// `current` itself.
#[must_use]
pub fn next_statuses(workflow: &Workflow, current: Option<&Status>, role: Option<&Role>) -> Vec<Status> {
    let current_id = current.map(|status| status.id);
    let mut seen: HashSet<StatusId> = HashSet::new();
    let mut out = Vec::new();

    for rule in workflow.rules_from(current_id) {
        if current_id.is_none() && !rule.initial {
            continue;
        }
        if current_id.is_some() && !rule.permits(role) {
            tracing::trace!(rule = %rule, role = ?role.map(Role::as_str), "rule not permitted for role");
            continue;
        }
        if Some(rule.to.id) == current_id {
            continue;
        }
        if seen.insert(rule.to.id) {
            out.push(rule.to.clone());
        }
    }
    out
}

/// Gatekeeper for work item statuses
#[derive(Debug, Clone, Default)]
pub struct StatusEngine<R = EntityTypeResolver> {
    resolver: R,
    config: EngineConfig,
}

impl StatusEngine {
    /// Engine with the default resolver and configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: WorkflowResolver> StatusEngine<R> {
    /// Engine with a custom resolver
    #[must_use]
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            config: EngineConfig::default(),
        }
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolver used to find workflows
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Initial statuses of a workflow, in declaration order
    #[must_use]
    pub fn initial_statuses(&self, workflow: &Workflow) -> Vec<Status> {
        next_statuses(workflow, None, None)
    }

    /// Assign the default entity type and initial status to a new work item
    ///
    /// Picks the first type the catalog lists for `company` and the item's
    /// category, resolves its workflow and assigns the first initial status in
    /// declaration order. Nothing is written unless every step succeeds.
    ///
    /// # Errors
    /// - [`EngineError::AlreadyInitialized`] if the item already has a status
    /// - [`EngineError::NoTypesConfigured`] if the catalog has no types
    /// - [`EngineError::MissingConfiguration`] if the type has no workflow
    /// - [`EngineError::CompanyMismatch`] for cross-tenant configuration
    /// - [`EngineError::NoInitialStatus`] if the workflow has no initial rule
    pub fn initialize<W, C>(&self, item: &mut W, company: CompanyId, catalog: &C) -> Result<Status, EngineError>
    where
        W: WorkItem + ?Sized,
        C: TypeCatalog + ?Sized,
    {
        if let Some(current) = item.status() {
            return Err(EngineError::AlreadyInitialized {
                status: current.name.clone(),
            });
        }

        let category = item.category();
        let entity_type = catalog
            .list_types_for_company(company, category)
            .into_iter()
            .next()
            .ok_or_else(|| {
                tracing::error!(%company, %category, "no entity types configured");
                EngineError::NoTypesConfigured { company, category }
            })?;

        if entity_type.company != company {
            return Err(EngineError::CompanyMismatch(format!(
                "catalog returned type '{}' of company {} for company {company}",
                entity_type.name, entity_type.company
            )));
        }

        let workflow = self.resolver.resolve_type(Some(&entity_type)).map_err(|e| {
            tracing::error!(entity_type = %entity_type.name, error = %e, "cannot resolve workflow");
            e
        })?;

        let status = self
            .initial_statuses(&workflow)
            .into_iter()
            .next()
            .ok_or_else(|| {
                tracing::error!(workflow = workflow.name(), "workflow has no initial status");
                EngineError::NoInitialStatus {
                    workflow: workflow.name().to_string(),
                }
            })?;

        tracing::debug!(
            %category,
            entity_type = %entity_type.name,
            workflow = workflow.name(),
            status = %status.name,
            "initialized work item"
        );

        item.set_entity_type(entity_type);
        item.set_status(Some(status.clone()))?;
        Ok(status)
    }

    /// Statuses the item may move to next
    ///
    /// For an uninitialized item these are the workflow's initial statuses.
    /// An empty list means the current status is terminal.
    ///
    /// # Errors
    /// [`EngineError::MissingConfiguration`] / [`EngineError::CompanyMismatch`]
    /// if the workflow cannot be resolved
    pub fn valid_next_statuses<W>(&self, item: &W, role: Option<&Role>) -> Result<Vec<Status>, EngineError>
    where
        W: WorkItem + ?Sized,
    {
        let workflow = self.resolver.resolve(item)?;
        Ok(next_statuses(&workflow, item.status(), role))
    }

    /// Statuses a status picker offers: the current status, then the valid
    /// next statuses ordered per [`EngineConfig::picker_order`]
    ///
    /// # Errors
    /// Same as [`StatusEngine::valid_next_statuses`]
    pub fn selectable_statuses<W>(&self, item: &W, role: Option<&Role>) -> Result<Vec<Status>, EngineError>
    where
        W: WorkItem + ?Sized,
    {
        let mut next = self.valid_next_statuses(item, role)?;
        if self.config.picker_order == PickerOrder::SortOrder {
            next.sort_by_key(|status| status.sort_order);
        }

        let mut out = Vec::with_capacity(next.len() + 1);
        out.extend(item.status().cloned());
        out.extend(next);
        Ok(out)
    }

    /// Whether the item may move to `requested`
    ///
    /// Requesting the current status is always allowed and never consults the
    /// workflow. Any other status must be among
    /// [`StatusEngine::valid_next_statuses`] for `role`. A `false` result is
    /// an ordinary outcome, not an error.
    ///
    /// # Errors
    /// [`EngineError::MissingConfiguration`] / [`EngineError::CompanyMismatch`]
    /// if the workflow cannot be resolved
    pub fn validate_transition<W>(&self, item: &W, requested: &Status, role: Option<&Role>) -> Result<bool, EngineError>
    where
        W: WorkItem + ?Sized,
    {
        if item.status().is_some_and(|current| current.is(requested)) {
            return Ok(true);
        }

        let allowed = self
            .valid_next_statuses(item, role)?
            .iter()
            .any(|status| status.is(requested));

        if !allowed {
            tracing::debug!(
                from = item.status().map_or(NEW_LABEL, |s| s.name.as_str()),
                to = %requested.name,
                role = ?role.map(Role::as_str),
                "status transition rejected"
            );
        }
        Ok(allowed)
    }

    /// Like [`StatusEngine::validate_transition`], but a rejection is an error
    ///
    /// # Errors
    /// [`EngineError::IllegalTransition`] if the transition is not allowed, or
    /// any resolution error
    pub fn require_transition<W>(&self, item: &W, requested: &Status, role: Option<&Role>) -> Result<(), EngineError>
    where
        W: WorkItem + ?Sized,
    {
        if self.validate_transition(item, requested, role)? {
            Ok(())
        } else {
            Err(EngineError::IllegalTransition {
                from: item
                    .status()
                    .map_or_else(|| NEW_LABEL.to_string(), |s| s.name.clone()),
                to: requested.name.clone(),
            })
        }
    }

    /// Validate and commit a status change
    ///
    /// # Errors
    /// Same as [`StatusEngine::require_transition`]; the item is unchanged on error
    pub fn apply_transition<W>(
        &self,
        item: &mut W,
        requested: Status,
        role: Option<&Role>,
    ) -> Result<TransitionOutcome, EngineError>
    where
        W: WorkItem + ?Sized,
    {
        if item.status().is_some_and(|current| current.is(&requested)) {
            return Ok(TransitionOutcome::Unchanged);
        }

        self.require_transition(item, &requested, role)?;
        let from = item.status().cloned();
        item.set_status(Some(requested.clone()))?;

        tracing::debug!(
            from = from.as_ref().map_or(NEW_LABEL, |s| s.name.as_str()),
            to = %requested.name,
            "status changed"
        );
        Ok(TransitionOutcome::Changed { from, to: requested })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work_item::Lifecycle;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use wfs_model::{EntityType, TransitionRule, WorkItemCategory};

    #[derive(Debug, Default)]
    struct Ticket {
        lifecycle: Lifecycle,
    }

    impl WorkItem for Ticket {
        fn category(&self) -> WorkItemCategory {
            WorkItemCategory::Issue
        }

        fn lifecycle(&self) -> &Lifecycle {
            &self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut Lifecycle {
            &mut self.lifecycle
        }
    }

    struct Fixture {
        company: CompanyId,
        open: Status,
        progress: Status,
        done: Status,
        catalog: Vec<EntityType>,
    }

    fn fixture() -> Fixture {
        let company = CompanyId::new();
        let open = Status::new("Open", company).with_sort_order(1);
        let progress = Status::new("In Progress", company).with_sort_order(2);
        let done = Status::new("Done", company).with_sort_order(3);

        let workflow = Workflow::new("Default", company)
            .with_rule(TransitionRule::initial(open.clone()))
            .and_then(|w| w.with_rule(TransitionRule::between(open.clone(), done.clone())))
            .and_then(|w| w.with_rule(TransitionRule::between(open.clone(), progress.clone())))
            .and_then(|w| w.with_rule(TransitionRule::between(progress.clone(), done.clone()).restricted_to("MANAGER")))
            .unwrap();

        let catalog = vec![EntityType::new("Bug", company, WorkItemCategory::Issue).with_workflow(Arc::new(workflow))];
        Fixture {
            company,
            open,
            progress,
            done,
            catalog,
        }
    }

    fn names(statuses: &[Status]) -> Vec<&str> {
        statuses.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn initialize_assigns_type_and_status() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();

        let status = engine.initialize(&mut ticket, f.company, &f.catalog).unwrap();
        assert!(status.is(&f.open));
        assert_eq!(ticket.entity_type().map(|t| t.name.as_str()), Some("Bug"));
        assert_eq!(ticket.status(), Some(&f.open));
    }

    #[test]
    fn initialize_twice_fails() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        engine.initialize(&mut ticket, f.company, &f.catalog).unwrap();

        let err = engine.initialize(&mut ticket, f.company, &f.catalog).unwrap_err();
        assert!(err.is_programming_error());
    }

    #[test]
    fn initialize_without_types_leaves_item_untouched() {
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        let empty: Vec<EntityType> = Vec::new();

        let err = engine.initialize(&mut ticket, CompanyId::new(), &empty).unwrap_err();
        assert!(matches!(err, EngineError::NoTypesConfigured { .. }));
        assert!(ticket.entity_type().is_none());
        assert!(ticket.status().is_none());
    }

    #[test]
    fn next_statuses_in_declaration_order() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        engine.initialize(&mut ticket, f.company, &f.catalog).unwrap();

        let next = engine.valid_next_statuses(&ticket, None).unwrap();
        assert_eq!(names(&next), vec!["Done", "In Progress"]);
    }

    #[test]
    fn picker_lists_current_first() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        engine.initialize(&mut ticket, f.company, &f.catalog).unwrap();

        let picker = engine.selectable_statuses(&ticket, None).unwrap();
        assert_eq!(names(&picker), vec!["Open", "Done", "In Progress"]);

        let sorted = StatusEngine::new()
            .with_config(EngineConfig::new().with_picker_order(PickerOrder::SortOrder))
            .selectable_statuses(&ticket, None)
            .unwrap();
        assert_eq!(names(&sorted), vec!["Open", "In Progress", "Done"]);
    }

    #[test]
    fn picker_for_new_item_offers_initial_statuses() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        ticket.set_entity_type(f.catalog[0].clone());

        let picker = engine.selectable_statuses(&ticket, None).unwrap();
        assert_eq!(names(&picker), vec!["Open"]);
    }

    #[test]
    fn role_restricted_edge() {
        let f = fixture();
        let engine = StatusEngine::new();
        let manager = Role::new("MANAGER");
        let developer = Role::new("DEVELOPER");
        let mut ticket = Ticket::default();
        engine.initialize(&mut ticket, f.company, &f.catalog).unwrap();
        engine.apply_transition(&mut ticket, f.progress.clone(), None).unwrap();

        assert!(engine.validate_transition(&ticket, &f.done, Some(&manager)).unwrap());
        assert!(!engine.validate_transition(&ticket, &f.done, Some(&developer)).unwrap());
        assert!(!engine.validate_transition(&ticket, &f.done, None).unwrap());
    }

    #[test]
    fn apply_transition_reports_outcome() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        engine.initialize(&mut ticket, f.company, &f.catalog).unwrap();

        let outcome = engine.apply_transition(&mut ticket, f.open.clone(), None).unwrap();
        assert_eq!(outcome, TransitionOutcome::Unchanged);

        let outcome = engine.apply_transition(&mut ticket, f.progress.clone(), None).unwrap();
        assert!(outcome.is_changed());
        assert_eq!(ticket.status(), Some(&f.progress));
    }

    #[test]
    fn illegal_transition_leaves_item_unchanged() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        engine.initialize(&mut ticket, f.company, &f.catalog).unwrap();
        engine.apply_transition(&mut ticket, f.done.clone(), None).unwrap();

        let err = engine.apply_transition(&mut ticket, f.open.clone(), None).unwrap_err();
        assert_eq!(
            err,
            EngineError::IllegalTransition {
                from: "Done".into(),
                to: "Open".into()
            }
        );
        assert!(err.is_recoverable());
        assert_eq!(ticket.status(), Some(&f.done));
    }

    #[test]
    fn self_transition_needs_no_workflow() {
        let f = fixture();
        let engine = StatusEngine::new();
        let mut ticket = Ticket::default();
        ticket.set_status(Some(f.open.clone())).unwrap();

        assert!(engine.validate_transition(&ticket, &f.open, None).unwrap());
        assert_eq!(
            engine.validate_transition(&ticket, &f.done, None),
            Err(EngineError::missing_entity_type())
        );
    }

    #[test]
    fn next_statuses_follow_current_status() {
        let company = CompanyId::new();
        let a = Status::new("A", company);
        let b = Status::new("B", company);
        let mut workflow = Workflow::new("W", company);
        workflow.add_rule(TransitionRule::initial(a.clone())).unwrap();
        workflow.add_rule(TransitionRule::initial(b.clone())).unwrap();
        workflow.add_rule(TransitionRule::between(b.clone(), a.clone())).unwrap();

        assert_eq!(names(&next_statuses(&workflow, None, None)), vec!["A", "B"]);
        assert_eq!(names(&next_statuses(&workflow, Some(&b), None)), vec!["A"]);
        assert!(next_statuses(&workflow, Some(&a), None).is_empty());
    }
}
