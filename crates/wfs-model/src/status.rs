use crate::ids::{CompanyId, StatusId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default color for statuses created without explicit display metadata
pub const DEFAULT_STATUS_COLOR: &str = "#808080";

/// A named lifecycle state, owned by a company
///
/// Identity is the [`StatusId`]; the engine compares statuses by id only, so a
/// renamed status is still the same state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status {
    /// Unique id
    pub id: StatusId,
    /// Display name, unique per company
    pub name: String,
    /// Display color (CSS notation)
    pub color: String,
    /// Sort order used by pickers and boards
    pub sort_order: i32,
    /// Owning company
    pub company: CompanyId,
}

impl Status {
    /// Create a status with default display metadata
    #[must_use]
    pub fn new(name: impl Into<String>, company: CompanyId) -> Self {
        Self {
            id: StatusId::new(),
            name: name.into(),
            color: DEFAULT_STATUS_COLOR.to_string(),
            sort_order: 0,
            company,
        }
    }

    /// With display color
    #[inline]
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// With sort order
    #[inline]
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Same lifecycle state (id equality)
    #[inline]
    #[must_use]
    pub fn is(&self, other: &Status) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_status_has_defaults() {
        let company = CompanyId::new();
        let status = Status::new("Open", company);
        assert_eq!(status.name, "Open");
        assert_eq!(status.color, DEFAULT_STATUS_COLOR);
        assert_eq!(status.sort_order, 0);
        assert_eq!(status.company, company);
    }

    #[test]
    fn identity_survives_rename() {
        let status = Status::new("Open", CompanyId::new()).with_sort_order(3);
        let mut renamed = status.clone();
        renamed.name = "Reopened".to_string();
        assert!(status.is(&renamed));
        assert_ne!(status, renamed);
    }

    #[test]
    fn display_uses_name() {
        let status = Status::new("In Progress", CompanyId::new()).with_color("#0000ff");
        assert_eq!(status.to_string(), "In Progress");
    }
}
