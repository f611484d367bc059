//! WFS Engine
//!
//! Decides the status lifecycle of work items from their entity type:
//! 1. **Initialization**: pick the default type for a new item and assign
//!    the workflow's first initial status
//! 2. **Transitions**: list the statuses an item may move to and gate every
//!    requested change against the workflow
//!
//! Configuration lives in a [`WorkflowRegistry`], usually populated from a
//! [`CatalogManifest`].
//!
//! # Quick Start
//!
//! ```rust
//! use wfs_engine::prelude::*;
//! use wfs_model::{CompanyId, EntityType, Status, TransitionRule, WorkItemCategory, Workflow};
//! use std::sync::Arc;
//!
//! struct Bug {
//!     lifecycle: Lifecycle,
//! }
//!
//! impl WorkItem for Bug {
//!     fn category(&self) -> WorkItemCategory {
//!         WorkItemCategory::Issue
//!     }
//!     fn lifecycle(&self) -> &Lifecycle {
//!         &self.lifecycle
//!     }
//!     fn lifecycle_mut(&mut self) -> &mut Lifecycle {
//!         &mut self.lifecycle
//!     }
//! }
//!
//! let company = CompanyId::new();
//! let open = Status::new("Open", company);
//! let done = Status::new("Done", company);
//! let workflow = Workflow::new("Default", company)
//!     .with_rule(TransitionRule::initial(open.clone()))?
//!     .with_rule(TransitionRule::between(open.clone(), done.clone()))?;
//! let types = vec![EntityType::new("Bug", company, WorkItemCategory::Issue).with_workflow(Arc::new(workflow))];
//!
//! let engine = StatusEngine::new();
//! let mut bug = Bug { lifecycle: Lifecycle::new() };
//! assert_eq!(engine.initialize(&mut bug, company, &types)?, open);
//! assert!(engine.validate_transition(&bug, &done, None)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod work_item;

pub use catalog::TypeCatalog;
pub use config::{EngineConfig, PickerOrder};
pub use engine::{next_statuses, StatusEngine, TransitionOutcome};
pub use error::{EngineError, MissingConfiguration, NullStatusViolation};
pub use manifest::{CatalogManifest, ConfigError, LoadedCatalog};
pub use registry::{NoLiveItems, RegistryError, StatusUsage, WorkflowRegistry};
pub use resolver::{EntityTypeResolver, WorkflowResolver};
pub use work_item::{Lifecycle, WorkItem};

/// Commonly used engine types
pub mod prelude {
    pub use crate::catalog::TypeCatalog;
    pub use crate::engine::{StatusEngine, TransitionOutcome};
    pub use crate::error::EngineError;
    pub use crate::registry::WorkflowRegistry;
    pub use crate::resolver::WorkflowResolver;
    pub use crate::work_item::{Lifecycle, WorkItem};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
