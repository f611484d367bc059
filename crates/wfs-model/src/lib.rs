//! WFS Model
//!
//! Company-scoped configuration that drives the status lifecycle of work items.
//!
//! # Core Concepts
//!
//! - [`Status`]: A named lifecycle state with display metadata
//! - [`TransitionRule`]: One directed edge `from → to`, optionally role-restricted
//! - [`Workflow`]: An ordered set of transition rules for one category of work item
//! - [`EntityType`]: A classifier ("Bug", "Improvement") that selects a workflow
//! - [`Role`]: Opaque actor role compared against rule restrictions
//!
//! # Example
//!
//! ```rust
//! use wfs_model::{CompanyId, Status, TransitionRule, Workflow};
//!
//! let company = CompanyId::new();
//! let open = Status::new("Open", company);
//! let done = Status::new("Done", company);
//!
//! let workflow = Workflow::new("Default", company)
//!     .with_rule(TransitionRule::initial(open.clone()))?
//!     .with_rule(TransitionRule::between(open, done))?;
//!
//! assert!(workflow.validate().is_ok());
//! # Ok::<(), wfs_model::ModelError>(())
//! ```

#![warn(unreachable_pub)]

mod entity_type;
mod error;
mod ids;
mod role;
mod rule;
mod status;
mod workflow;

pub use entity_type::{EntityType, WorkItemCategory};
pub use error::ModelError;
pub use ids::{CompanyId, EntityTypeId, StatusId, WorkflowId};
pub use role::Role;
pub use rule::TransitionRule;
pub use status::{Status, DEFAULT_STATUS_COLOR};
pub use workflow::Workflow;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
