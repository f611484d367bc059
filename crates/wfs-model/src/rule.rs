//! Transition rules
//!
//! A rule is one directed edge of a workflow. A rule without a `from` status
//! is an *initial* rule: it names a status a freshly created work item may
//! start in.

use crate::ids::StatusId;
use crate::role::Role;
use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One directed edge `from → to` in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    /// Source status; `None` for initial rules
    pub from: Option<Status>,
    /// Target status
    pub to: Status,
    /// Marks the rule as an initial assignment (must agree with `from.is_none()`)
    pub initial: bool,
    /// Role required to take this edge; `None` means unrestricted
    pub allowed_role: Option<Role>,
}

impl TransitionRule {
    /// Initial rule: `∅ → to`
    #[must_use]
    pub fn initial(to: Status) -> Self {
        Self {
            from: None,
            to,
            initial: true,
            allowed_role: None,
        }
    }

    /// Ordinary edge: `from → to`
    #[must_use]
    pub fn between(from: Status, to: Status) -> Self {
        Self {
            from: Some(from),
            to,
            initial: false,
            allowed_role: None,
        }
    }

    /// Restrict the edge to one role
    #[inline]
    #[must_use]
    pub fn restricted_to(mut self, role: impl Into<Role>) -> Self {
        self.allowed_role = Some(role.into());
        self
    }

    /// Id of the source status, if any
    #[inline]
    #[must_use]
    pub fn from_id(&self) -> Option<StatusId> {
        self.from.as_ref().map(|s| s.id)
    }

    /// Whether this rule leaves `current` (`None` = the uninitialized pre-state)
    #[inline]
    #[must_use]
    pub fn starts_from(&self, current: Option<StatusId>) -> bool {
        self.from_id() == current
    }

    /// Whether `role` may take this edge
    ///
    /// Unrestricted rules admit every caller, including one without a role.
    #[must_use]
    pub fn permits(&self, role: Option<&Role>) -> bool {
        match &self.allowed_role {
            None => true,
            Some(required) => role == Some(required),
        }
    }

    /// `initial` flag agrees with the absence of a source status
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.initial == self.from.is_none()
    }

    /// Same `(from, to)` edge, ignoring flags and role
    #[must_use]
    pub fn same_edge(&self, other: &TransitionRule) -> bool {
        self.from_id() == other.from_id() && self.to.id == other.to.id
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{from} -> {}", self.to)?,
            None => write!(f, "(new) -> {}", self.to)?,
        }
        if let Some(role) = &self.allowed_role {
            write!(f, " [{role}]")?;
        }
        Ok(())
    }
}
