//! Workflow definition
//!
//! A [`Workflow`] is an ordered list of [`TransitionRule`]s. Declaration order
//! is significant: the first initial rule decides where new work items start,
//! and next-status lists are reported in the order rules were added.
//!
//! Rules can only be added through [`Workflow::add_rule`], which rejects
//! edges that could never be legal (cross-company, self-loops, duplicates).
//! A workflow may still be *incomplete* (no initial rule); that is reported
//! by [`Workflow::validate`] and by the engine at initialization time.

use crate::error::ModelError;
use crate::ids::{CompanyId, StatusId, WorkflowId};
use crate::role::Role;
use crate::rule::TransitionRule;
use crate::status::Status;
use serde::Serialize;
use std::collections::HashSet;

const NEW_LABEL: &str = "(new)";

/// Company-scoped status transition graph for one category of work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
    company: CompanyId,
    rules: Vec<TransitionRule>,
}

impl Workflow {
    /// Create an empty workflow
    #[must_use]
    pub fn new(name: impl Into<String>, company: CompanyId) -> Self {
        Self::with_id(WorkflowId::new(), name, company)
    }

    /// Create an empty workflow with a known id
    #[must_use]
    pub fn with_id(id: WorkflowId, name: impl Into<String>, company: CompanyId) -> Self {
        Self {
            id,
            name: name.into(),
            company,
            rules: Vec::new(),
        }
    }

    /// Workflow id
    #[inline]
    #[must_use]
    pub fn id(&self) -> WorkflowId {
        self.id
    }

    /// Workflow name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning company
    #[inline]
    #[must_use]
    pub fn company(&self) -> CompanyId {
        self.company
    }

    /// Rules in declaration order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the workflow has no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append a rule
    ///
    /// # Errors
    /// - [`ModelError::InitialFlagMismatch`] if `initial` disagrees with `from`
    /// - [`ModelError::SelfTransition`] if `from == to`
    /// - [`ModelError::CompanyMismatch`] if a status belongs to another company
    /// - [`ModelError::DuplicateTransition`] if the edge already exists
    pub fn add_rule(&mut self, rule: TransitionRule) -> Result<(), ModelError> {
        if !rule.is_consistent() {
            return Err(ModelError::InitialFlagMismatch {
                from: label(rule.from.as_ref()),
                to: rule.to.name.clone(),
            });
        }

        if let Some(from) = &rule.from {
            if from.is(&rule.to) {
                return Err(ModelError::SelfTransition {
                    status: from.name.clone(),
                });
            }
            self.check_company(from)?;
        }
        self.check_company(&rule.to)?;

        if self.rules.iter().any(|existing| existing.same_edge(&rule)) {
            return Err(ModelError::DuplicateTransition {
                workflow: self.name.clone(),
                from: label(rule.from.as_ref()),
                to: rule.to.name.clone(),
            });
        }

        self.rules.push(rule);
        Ok(())
    }

    /// Append a rule, builder style
    ///
    /// # Errors
    /// Same as [`Workflow::add_rule`]
    pub fn with_rule(mut self, rule: TransitionRule) -> Result<Self, ModelError> {
        self.add_rule(rule)?;
        Ok(self)
    }

    /// Remove the `(from, to)` edge, returning it if it existed
    pub fn remove_rule(&mut self, from: Option<StatusId>, to: StatusId) -> Option<TransitionRule> {
        let index = self.position(from, to)?;
        Some(self.rules.remove(index))
    }

    /// Change the role restriction of an existing edge
    ///
    /// # Errors
    /// [`ModelError::UnknownTransition`] if the edge is not defined
    pub fn set_rule_role(
        &mut self,
        from: Option<StatusId>,
        to: StatusId,
        role: Option<Role>,
    ) -> Result<(), ModelError> {
        match self.position(from, to) {
            Some(index) => {
                self.rules[index].allowed_role = role;
                Ok(())
            }
            None => Err(ModelError::UnknownTransition {
                workflow: self.name.clone(),
                from: self.status_label(from),
                to: self.status_label(Some(to)),
            }),
        }
    }

    /// Replace the display metadata of `status` wherever a rule references it
    ///
    /// Returns `true` if any rule was updated.
    pub fn refresh_status(&mut self, status: &Status) -> bool {
        let mut touched = false;
        for rule in &mut self.rules {
            if let Some(from) = rule.from.as_mut().filter(|from| from.is(status)) {
                from.clone_from(status);
                touched = true;
            }
            if rule.to.is(status) {
                rule.to.clone_from(status);
                touched = true;
            }
        }
        touched
    }

    /// Check completeness: at least one initial rule
    ///
    /// # Errors
    /// [`ModelError::NoInitialTransition`] if no rule is initial
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.initial_rules().next().is_none() {
            return Err(ModelError::NoInitialTransition {
                workflow: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Rules that define initial statuses
    pub fn initial_rules(&self) -> impl Iterator<Item = &TransitionRule> {
        self.rules.iter().filter(|rule| rule.initial && rule.from.is_none())
    }

    /// Rules leaving `from` (`None` = initial rules)
    pub fn rules_from(&self, from: Option<StatusId>) -> impl Iterator<Item = &TransitionRule> {
        self.rules.iter().filter(move |rule| rule.starts_from(from))
    }

    /// Rules entering `to`
    pub fn rules_to(&self, to: StatusId) -> impl Iterator<Item = &TransitionRule> {
        self.rules.iter().filter(move |rule| rule.to.id == to)
    }

    /// Rules restricted to exactly `role`
    pub fn rules_for_role<'a>(&'a self, role: &'a Role) -> impl Iterator<Item = &'a TransitionRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.allowed_role.as_ref() == Some(role))
    }

    /// Whether any rule references `status` as source or target
    #[must_use]
    pub fn references_status(&self, status: StatusId) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.to.id == status || rule.from_id() == Some(status))
    }

    /// Look up a status by id among the statuses this workflow references
    #[must_use]
    pub fn status(&self, id: StatusId) -> Option<&Status> {
        self.statuses().into_iter().find(|status| status.id == id)
    }

    /// Distinct statuses referenced by the rules, in first-appearance order
    #[must_use]
    pub fn statuses(&self) -> Vec<&Status> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for rule in &self.rules {
            for status in rule.from.iter().chain(std::iter::once(&rule.to)) {
                if seen.insert(status.id) {
                    out.push(status);
                }
            }
        }
        out
    }

    /// Statuses with no outgoing rule
    #[must_use]
    pub fn terminal_statuses(&self) -> Vec<&Status> {
        self.statuses()
            .into_iter()
            .filter(|status| self.rules_from(Some(status.id)).next().is_none())
            .collect()
    }

    fn position(&self, from: Option<StatusId>, to: StatusId) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.starts_from(from) && rule.to.id == to)
    }

    fn check_company(&self, status: &Status) -> Result<(), ModelError> {
        if status.company == self.company {
            Ok(())
        } else {
            Err(ModelError::company_mismatch(
                format!("status '{}'", status.name),
                self.company,
                status.company,
            ))
        }
    }

    fn status_label(&self, id: Option<StatusId>) -> String {
        match id {
            None => NEW_LABEL.to_string(),
            Some(id) => self
                .status(id)
                .map_or_else(|| id.to_string(), |status| status.name.clone()),
        }
    }
}

fn label(status: Option<&Status>) -> String {
    status.map_or_else(|| NEW_LABEL.to_string(), |status| status.name.clone())
}
