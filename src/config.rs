//! Catalog-wide configuration threaded through the loader.
//!
//! The project group is an explicit value handed to the loader instead of
//! process-wide state, so two catalogues with different conventions can be
//! loaded side by side.

use crate::catalogue::identity::Scope;
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Project group used when no configuration overrides it.
pub const DEFAULT_PROJECT_GROUP: &str = "org.sensenet";

/// Settings that shape how a catalogue is loaded and validated.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Namespace prefix schemas and class references are rooted in.
    pub project_group: String,
    /// Scopes whose definition directory must exist under the root.
    pub mandatory_scopes: Vec<Scope>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            project_group: DEFAULT_PROJECT_GROUP.to_string(),
            mandatory_scopes: Vec::new(),
        }
    }
}

impl CatalogConfig {
    /// Read configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&data).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Expand a class shorthand starting with `.` to a full class name.
    ///
    /// Returns `None` for empty input so absent optional references stay
    /// absent instead of becoming the bare project group.
    pub fn expand_class(&self, class: &str) -> Option<String> {
        if class.is_empty() {
            None
        } else if class.starts_with('.') {
            Some(format!("{}{class}", self.project_group))
        } else {
            Some(class.to_string())
        }
    }

    /// Default key schema for raw measurement topics.
    pub fn measurement_key_schema(&self) -> String {
        format!("{}.kafka.MeasurementKey", self.project_group)
    }

    /// Key schema for windowed aggregate topics.
    pub fn aggregate_key_schema(&self) -> String {
        format!("{}.kafka.AggregateKey", self.project_group)
    }
}
