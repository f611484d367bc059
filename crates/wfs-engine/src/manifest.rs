//! Catalog manifests
//!
//! A manifest describes one company's status configuration in YAML or TOML:
//! statuses, workflows whose transitions name statuses by their display
//! name, and entity types bound to workflows. Loading a manifest produces a
//! populated [`WorkflowRegistry`].
//!
//! ```yaml
//! company: Acme
//! engine:
//!   picker_order: sort_order
//! statuses:
//!   - name: Open
//!     sort_order: 1
//!   - name: Done
//!     color: "#2e7d32"
//!     sort_order: 2
//! workflows:
//!   - name: Default
//!     transitions:
//!       - to: Open
//!       - from: Open
//!         to: Done
//!         role: MANAGER
//! types:
//!   - name: Bug
//!     category: issue
//!     workflow: Default
//! ```

use crate::config::EngineConfig;
use crate::registry::{RegistryError, WorkflowRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use wfs_model::{
    CompanyId, ModelError, Status, StatusId, TransitionRule, WorkItemCategory, Workflow, WorkflowId,
    DEFAULT_STATUS_COLOR,
};

/// Manifest loading and assembly errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read catalog manifest {path}: {source}")]
    Io {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parse failure
    #[error("failed to parse catalog manifest as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse failure
    #[error("failed to parse catalog manifest as TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Transition names a status not declared in `statuses`
    #[error("workflow '{workflow}' references undeclared status '{status}'")]
    UnknownStatus {
        /// Workflow name
        workflow: String,
        /// Status name
        status: String,
    },

    /// Type names a workflow not declared in `workflows`
    #[error("entity type '{entity_type}' references undeclared workflow '{workflow}'")]
    UnknownWorkflow {
        /// Type name
        entity_type: String,
        /// Workflow name
        workflow: String,
    },

    /// Two workflows share a name
    #[error("workflow '{0}' is declared more than once")]
    DuplicateWorkflow(String),

    /// Rule or category violation
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Registry rejected the configuration
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Root of a catalog manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogManifest {
    /// Company display name
    #[serde(default)]
    pub company: Option<String>,
    /// Fixed company id; a fresh id is generated when absent
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// Declared statuses
    #[serde(default)]
    pub statuses: Vec<StatusSpec>,
    /// Declared workflows
    #[serde(default)]
    pub workflows: Vec<WorkflowSpec>,
    /// Declared entity types, in catalog order
    #[serde(default)]
    pub types: Vec<TypeSpec>,
}

/// Status entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSpec {
    /// Display name, unique within the manifest
    pub name: String,
    /// Display color
    #[serde(default)]
    pub color: Option<String>,
    /// Picker sort order
    #[serde(default)]
    pub sort_order: i32,
}

/// Workflow entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// Workflow name, unique within the manifest
    pub name: String,
    /// Transitions in declaration order
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

/// Transition entry; statuses are referenced by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Source status, absent for initial transitions
    #[serde(default)]
    pub from: Option<String>,
    /// Target status
    pub to: String,
    /// Initial flag; defaults to "no source status"
    #[serde(default)]
    pub initial: Option<bool>,
    /// Role restriction
    #[serde(default)]
    pub role: Option<String>,
}

/// Entity type entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Type name
    pub name: String,
    /// Work item category, e.g. `issue` or `test-case`
    pub category: String,
    /// Workflow name
    pub workflow: String,
}

/// A manifest materialized into a registry
#[derive(Debug)]
pub struct LoadedCatalog {
    /// Populated registry
    pub registry: WorkflowRegistry,
    /// Company every record belongs to
    pub company: CompanyId,
    /// Engine settings from the manifest
    pub engine: EngineConfig,
}

impl CatalogManifest {
    /// Load a manifest, choosing the format by file extension
    ///
    /// `.yaml`/`.yml` and `.toml` are parsed directly; anything else is tried
    /// as YAML first, then TOML.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, or a parse error
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let manifest = match ext.as_str() {
            "yml" | "yaml" => Self::from_yaml_str(&contents)?,
            "toml" => Self::from_toml_str(&contents)?,
            _ => Self::from_yaml_str(&contents).or_else(|_| Self::from_toml_str(&contents))?,
        };
        tracing::debug!(
            path = %path.display(),
            statuses = manifest.statuses.len(),
            workflows = manifest.workflows.len(),
            types = manifest.types.len(),
            "loaded catalog manifest"
        );
        Ok(manifest)
    }

    /// Parse YAML text
    ///
    /// # Errors
    /// [`ConfigError::Yaml`] on malformed input
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`ConfigError::Toml`] on malformed input
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Build a registry holding everything the manifest declares
    ///
    /// Workflows without an initial transition are accepted; items of such
    /// types fail at initialization instead. Use [`Workflow::validate`] to
    /// report them ahead of time.
    ///
    /// # Errors
    /// - [`ConfigError::UnknownStatus`] / [`ConfigError::UnknownWorkflow`] for dangling names
    /// - [`ConfigError::Model`] for invalid categories or rules
    /// - [`ConfigError::Registry`] for duplicate names
    pub fn into_registry(&self) -> Result<LoadedCatalog, ConfigError> {
        let company = self.company_id.unwrap_or_default();
        let registry = WorkflowRegistry::new();

        let mut statuses: HashMap<&str, Status> = HashMap::new();
        for spec in &self.statuses {
            let status = Status::new(&spec.name, company)
                .with_color(spec.color.as_deref().unwrap_or(DEFAULT_STATUS_COLOR))
                .with_sort_order(spec.sort_order);
            registry.add_status(status.clone())?;
            statuses.insert(spec.name.as_str(), status);
        }

        let mut workflows: HashMap<&str, WorkflowId> = HashMap::new();
        for spec in &self.workflows {
            if workflows.contains_key(spec.name.as_str()) {
                return Err(ConfigError::DuplicateWorkflow(spec.name.clone()));
            }
            let mut workflow = Workflow::new(&spec.name, company);
            for transition in &spec.transitions {
                workflow.add_rule(transition.to_rule(&spec.name, &statuses)?)?;
            }
            workflows.insert(spec.name.as_str(), registry.add_workflow(workflow)?);
        }

        for spec in &self.types {
            let category: WorkItemCategory = spec.category.parse()?;
            let workflow = workflows
                .get(spec.workflow.as_str())
                .copied()
                .ok_or_else(|| ConfigError::UnknownWorkflow {
                    entity_type: spec.name.clone(),
                    workflow: spec.workflow.clone(),
                })?;
            registry.add_entity_type(&spec.name, company, category, workflow)?;
        }

        tracing::info!(
            company = self.company.as_deref().unwrap_or("(unnamed)"),
            %company,
            "catalog assembled"
        );
        Ok(LoadedCatalog {
            registry,
            company,
            engine: self.engine,
        })
    }
}

impl TransitionSpec {
    fn to_rule(&self, workflow: &str, statuses: &HashMap<&str, Status>) -> Result<TransitionRule, ConfigError> {
        let lookup = |name: &str| {
            statuses.get(name).cloned().ok_or_else(|| ConfigError::UnknownStatus {
                workflow: workflow.to_string(),
                status: name.to_string(),
            })
        };
        let from = self.from.as_deref().map(lookup).transpose()?;
        let to = lookup(&self.to)?;
        Ok(TransitionRule {
            initial: self.initial.unwrap_or(from.is_none()),
            from,
            to,
            allowed_role: self.role.as_deref().map(Into::into),
        })
    }
}

impl LoadedCatalog {
    /// Status id by name
    #[must_use]
    pub fn status_id(&self, name: &str) -> Option<StatusId> {
        self.registry.find_status(self.company, name).map(|s| s.id)
    }
}
