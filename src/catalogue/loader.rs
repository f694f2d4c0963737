//! Loads a directory tree of source definitions into a [`Catalogue`].
//!
//! One YAML document per source, grouped in per-scope directories under
//! `<root>/specifications`. Parsing is strict about what the catalogue
//! needs (missing required fields, unknown discriminators, and duplicate
//! names abort the load) and lenient about the rest (unrecognized fields
//! are ignored).

use crate::catalogue::identity::Scope;
use crate::catalogue::index::Catalogue;
use crate::catalogue::model::{
    AppActiveSource, ConnectorSource, DataProducer, MonitorSource, PassiveSource, PushSource,
    QuestionnaireSource, StreamGroup,
};
use crate::catalogue::topic::{DataTopic, StreamDataTopic};
use crate::config::CatalogConfig;
use crate::error::LoadError;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Subdirectory of the catalog root holding the definition tree.
pub const SPECIFICATIONS_PATH: &str = "specifications";

/// Discriminator field selecting the active-source variant.
const ASSESSMENT_TYPE: &str = "assessment_type";

/// Load the source catalogue rooted at `root`.
///
/// Scopes without a directory are skipped unless the configuration marks
/// them mandatory. The returned catalogue is fully populated: every
/// derived index is built before this function returns.
pub fn load_catalogue(root: &Path, config: &CatalogConfig) -> Result<Catalogue, LoadError> {
    let spec_root = root.join(SPECIFICATIONS_PATH);
    let mut producers = Vec::new();
    let mut seen: BTreeSet<(Scope, String)> = BTreeSet::new();

    for scope in [
        Scope::Active,
        Scope::Monitor,
        Scope::Passive,
        Scope::Stream,
        Scope::Connector,
        Scope::Push,
    ] {
        let Some(dir) = scope.resolve(&spec_root) else {
            if config.mandatory_scopes.contains(&scope) {
                return Err(LoadError::MissingScope(scope));
            }
            info!(scope = %scope, "sources folder not present");
            continue;
        };

        for file in definition_files(&dir)? {
            debug!(path = %file.display(), "parsing source definition");
            let producer = parse_definition(scope, &file, config)?;
            if !seen.insert((scope, producer.name())) {
                return Err(LoadError::DuplicateSource {
                    scope,
                    name: producer.name(),
                });
            }
            producers.push(producer);
        }
    }

    Ok(Catalogue::new(producers))
}

/// Definition files under `dir`, recursively, in stable order.
fn definition_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    collect_definitions(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_definitions(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<(), LoadError> {
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
            collect_definitions(&path, acc)?;
        } else if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yml") | Some("yaml")
        ) {
            acc.push(path);
        }
    }
    Ok(())
}

/// Parse one definition file into the variant its scope (and, for active
/// sources, its discriminator) selects.
fn parse_definition(
    scope: Scope,
    path: &Path,
    config: &CatalogConfig,
) -> Result<DataProducer, LoadError> {
    let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let producer = match scope {
        Scope::Active => parse_active(path, &data, config)?,
        Scope::Monitor => {
            let mut source: MonitorSource = parse_yaml(path, &data)?;
            source.spec_path = path.to_path_buf();
            source.app_provider = expand_optional(config, source.app_provider.take());
            finish_data_topics(&mut source.data, config);
            DataProducer::Monitor(source)
        }
        Scope::Passive => {
            let mut source: PassiveSource = parse_yaml(path, &data)?;
            source.spec_path = path.to_path_buf();
            source.app_provider = expand_optional(config, source.app_provider.take());
            for sensor in &mut source.sensors {
                finish_data_topic(&mut sensor.topic, config);
            }
            for processor in &mut source.processors {
                if processor.input_key_schema.is_none() {
                    processor.input_key_schema = Some(config.measurement_key_schema());
                }
                processor.aggregator = expand_optional(config, processor.aggregator.take());
                if let Some(expanded) = config.expand_class(&processor.input_value_schema) {
                    processor.input_value_schema = expanded;
                }
            }
            DataProducer::Passive(source)
        }
        Scope::Stream => {
            let mut source: StreamGroup = parse_yaml(path, &data)?;
            source.spec_path = path.to_path_buf();
            for topic in &mut source.data {
                finish_stream_topic(topic, path, config)?;
            }
            DataProducer::Stream(source)
        }
        Scope::Connector => {
            let mut source: ConnectorSource = parse_yaml(path, &data)?;
            source.spec_path = path.to_path_buf();
            finish_data_topics(&mut source.data, config);
            DataProducer::Connector(source)
        }
        Scope::Push => {
            let mut source: PushSource = parse_yaml(path, &data)?;
            source.spec_path = path.to_path_buf();
            finish_data_topics(&mut source.data, config);
            DataProducer::Push(source)
        }
        Scope::Kafka | Scope::Catalogue => {
            // These scopes hold shared schemas, not source definitions.
            return Err(LoadError::UnknownKind {
                path: path.to_path_buf(),
                kind: scope.to_string(),
            });
        }
    };

    Ok(producer)
}

/// Dispatch an active definition on its `assessment_type` discriminator.
fn parse_active(
    path: &Path,
    data: &str,
    config: &CatalogConfig,
) -> Result<DataProducer, LoadError> {
    let document: serde_yaml::Value = serde_yaml::from_str(data).map_err(|source| {
        LoadError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let kind = document
        .get(ASSESSMENT_TYPE)
        .and_then(serde_yaml::Value::as_str)
        .unwrap_or("");

    match kind {
        "QUESTIONNAIRE" => {
            let mut source: QuestionnaireSource = parse_yaml(path, data)?;
            source.spec_path = path.to_path_buf();
            if source.key_schema.is_none() {
                source.key_schema = Some(config.measurement_key_schema());
            } else {
                source.key_schema = expand_optional(config, source.key_schema.take());
            }
            if let Some(expanded) = config.expand_class(&source.value_schema) {
                source.value_schema = expanded;
            }
            Ok(DataProducer::Questionnaire(source))
        }
        "APP" => {
            let mut source: AppActiveSource = parse_yaml(path, data)?;
            source.spec_path = path.to_path_buf();
            source.app_provider = expand_optional(config, source.app_provider.take());
            finish_data_topics(&mut source.data, config);
            Ok(DataProducer::AppActive(source))
        }
        other => Err(LoadError::UnknownKind {
            path: path.to_path_buf(),
            kind: if other.is_empty() {
                format!("({ASSESSMENT_TYPE} missing)")
            } else {
                other.to_string()
            },
        }),
    }
}

fn parse_yaml<T: DeserializeOwned>(path: &Path, data: &str) -> Result<T, LoadError> {
    serde_yaml::from_str(data).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn expand_optional(config: &CatalogConfig, value: Option<String>) -> Option<String> {
    value.and_then(|v| config.expand_class(&v))
}

fn finish_data_topics(topics: &mut [DataTopic], config: &CatalogConfig) {
    for topic in topics {
        finish_data_topic(topic, config);
    }
}

/// Apply the platform defaults a parsed topic leaves implicit.
fn finish_data_topic(topic: &mut DataTopic, config: &CatalogConfig) {
    topic.key_schema = match topic.key_schema.take() {
        Some(key) => config.expand_class(&key),
        None => Some(config.measurement_key_schema()),
    };
    if let Some(expanded) = config.expand_class(&topic.value_schema) {
        topic.value_schema = expanded;
    }
    topic.aggregator = expand_optional(config, topic.aggregator.take());
    topic.app_provider = expand_optional(config, topic.app_provider.take());
}

/// Resolve stream inputs and re-key windowed outputs.
fn finish_stream_topic(
    topic: &mut StreamDataTopic,
    path: &Path,
    config: &CatalogConfig,
) -> Result<(), LoadError> {
    match topic.input_topic.take() {
        Some(single) if topic.input_topics.is_empty() => {
            if topic.topic_base.is_none() {
                topic.topic_base = Some(single.clone());
            }
            topic.input_topics.push(single);
        }
        Some(_) => {
            return Err(LoadError::ConflictingInputs {
                path: path.to_path_buf(),
            });
        }
        None if topic.input_topics.is_empty() => {
            return Err(LoadError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        None => {}
    }

    topic.key_schema = match topic.key_schema.take() {
        Some(key) => config.expand_class(&key),
        None => Some(config.measurement_key_schema()),
    };
    // Windowed rollups are keyed by aggregation window, not by measurement.
    if topic.windowed
        && topic.key_schema.as_deref() == Some(config.measurement_key_schema().as_str())
    {
        topic.key_schema = Some(config.aggregate_key_schema());
    }
    if let Some(expanded) = config.expand_class(&topic.value_schema) {
        topic.value_schema = expanded;
    }
    Ok(())
}
