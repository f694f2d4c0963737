//! Structural facts about on-disk schema files.
//!
//! Schema files are Avro `.avsc` documents, which are plain JSON: the
//! inspector only needs the declared namespace and record name, so it
//! reads them with a JSON parser instead of a full Avro implementation.
//! Files that fail to parse are recorded as unmapped rather than aborting
//! the walk; placement rules report them alongside other findings.

use crate::catalogue::identity::{ALL_SCOPES, Scope};
use crate::error::LoadError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory of the catalog root holding the schema tree.
pub const COMMONS_PATH: &str = "commons";

const SCHEMA_EXTENSION: &str = "avsc";

/// Namespace, record name, and location of one parsed schema file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaMetadata {
    pub namespace: String,
    pub name: String,
    pub scope: Scope,
    pub path: PathBuf,
}

impl SchemaMetadata {
    /// Fully qualified record name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// Schema file that could not be parsed into metadata.
#[derive(Clone, Debug)]
pub struct UnmappedSchema {
    pub path: PathBuf,
    pub reason: String,
}

/// All schema metadata under a commons root, indexed by full record name.
#[derive(Debug, Default)]
pub struct SchemaCatalogue {
    schemas: BTreeMap<String, SchemaMetadata>,
    unmapped: Vec<UnmappedSchema>,
}

impl SchemaCatalogue {
    /// Walk every scope directory under `commons_root` for schema files.
    pub fn load(commons_root: &Path) -> Result<Self, LoadError> {
        let mut catalogue = SchemaCatalogue::default();
        for scope in ALL_SCOPES {
            let Some(dir) = scope.resolve(commons_root) else {
                continue;
            };
            let mut files = Vec::new();
            collect_schemas(&dir, &mut files)?;
            files.sort();
            for path in files {
                debug!(path = %path.display(), "inspecting schema");
                catalogue.add_file(scope, &path)?;
            }
        }
        Ok(catalogue)
    }

    fn add_file(&mut self, scope: Scope, path: &Path) -> Result<(), LoadError> {
        let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(err) => {
                self.unmapped.push(UnmappedSchema {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
                return Ok(());
            }
        };

        let name = document.get("name").and_then(Value::as_str);
        let Some(name) = name else {
            self.unmapped.push(UnmappedSchema {
                path: path.to_path_buf(),
                reason: "schema declares no record name".to_string(),
            });
            return Ok(());
        };
        let namespace = document
            .get("namespace")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let metadata = SchemaMetadata {
            namespace: namespace.to_string(),
            name: name.to_string(),
            scope,
            path: path.to_path_buf(),
        };
        self.schemas.insert(metadata.full_name(), metadata);
        Ok(())
    }

    /// Parsed schemas in full-name order.
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaMetadata> {
        self.schemas.values()
    }

    /// Look up one schema by fully qualified record name.
    pub fn get(&self, full_name: &str) -> Option<&SchemaMetadata> {
        self.schemas.get(full_name)
    }

    /// Files that could not be parsed into schema metadata.
    pub fn unmapped(&self) -> &[UnmappedSchema] {
        &self.unmapped
    }
}

fn collect_schemas(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_schemas(&path, acc)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SCHEMA_EXTENSION))
        {
            acc.push(path);
        }
    }
    Ok(())
}

/// Convert a snake_case file name to the CamelCase record name it implies.
///
/// Conversion stops at the first `.`, so extensions never leak into the
/// record name. Underscores are dropped and the following character is
/// upper-cased.
pub fn snake_to_camel(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut next_upper = true;
    for c in value.chars() {
        match c {
            '_' => next_upper = true,
            '.' => break,
            c if next_upper => {
                result.extend(c.to_uppercase());
                next_upper = false;
            }
            c => result.push(c),
        }
    }
    result
}

/// Record name a schema file's name implies.
pub fn record_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    snake_to_camel(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn snake_to_camel_stops_at_first_dot() {
        assert_eq!(snake_to_camel("questionnaire.avsc"), "Questionnaire");
        assert_eq!(
            snake_to_camel("application_external_time.avsc"),
            "ApplicationExternalTime"
        );
        assert_eq!(
            snake_to_camel("empatica_e4_acceleration.avsc"),
            "EmpaticaE4Acceleration"
        );
        assert_eq!(snake_to_camel(""), "");
    }

    #[test]
    fn load_indexes_schemas_and_reports_unparseable_files() {
        let temp = TempDir::new().expect("temp dir");
        let passive = temp.path().join("passive/empatica");
        std::fs::create_dir_all(&passive).unwrap();
        std::fs::write(
            passive.join("empatica_e4_acceleration.avsc"),
            r#"{"type": "record", "name": "EmpaticaE4Acceleration",
                "namespace": "org.sensenet.passive.empatica", "fields": []}"#,
        )
        .unwrap();
        std::fs::write(passive.join("broken.avsc"), "{not json").unwrap();

        let catalogue = SchemaCatalogue::load(temp.path()).unwrap();
        let schema = catalogue
            .get("org.sensenet.passive.empatica.EmpaticaE4Acceleration")
            .expect("schema indexed");
        assert_eq!(schema.scope, Scope::Passive);
        assert_eq!(schema.name, "EmpaticaE4Acceleration");
        assert_eq!(catalogue.unmapped().len(), 1);
        assert!(catalogue.unmapped()[0].path.ends_with("broken.avsc"));
    }
}
