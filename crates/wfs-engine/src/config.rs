//! Engine configuration
//!
//! Only presentation concerns are configurable. The transition rules
//! themselves (first initial rule wins, self-transitions always allowed,
//! declaration order for next statuses) are fixed.

use serde::{Deserialize, Serialize};

/// Order in which [`crate::StatusEngine::selectable_statuses`] lists the
/// statuses after the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerOrder {
    /// Rule declaration order
    #[default]
    Declaration,
    /// Ascending status sort order, ties in declaration order
    SortOrder,
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordering of status picker candidates
    pub picker_order: PickerOrder,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With picker order
    #[inline]
    #[must_use]
    pub fn with_picker_order(mut self, order: PickerOrder) -> Self {
        self.picker_order = order;
        self
    }
}
