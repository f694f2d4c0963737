//! Deserializable source definitions, one variant per scope.
//!
//! The variants mirror the on-disk definition format so the loader can
//! parse one YAML document per source without ad-hoc value handling. The
//! closed [`DataProducer`] enum replaces a subtype hierarchy: the loader
//! dispatches on the definition's discriminator and everything downstream
//! matches on the variant.

use crate::catalogue::identity::Scope;
use crate::catalogue::topic::{
    DataTopic, SampleRate, StreamDataTopic, Topic, is_timed_aggregator, out_topic,
    state_store_name, timed_topic_names,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One answer option of a questionnaire question.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Response {
    pub text: String,
    pub score: i64,
}

/// One question of a questionnaire, with its ordered response options.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub lead: String,
    pub content: String,
    pub responses: Vec<Response>,
}

/// Active source filled in by a questionnaire app.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct QuestionnaireSource {
    pub name: String,
    pub topic: String,
    #[serde(rename = "key", default)]
    pub key_schema: Option<String>,
    #[serde(rename = "value")]
    pub value_schema: String,
    pub doc: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub register_schema: Option<bool>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub spec_path: PathBuf,
}

impl QuestionnaireSource {
    /// The questionnaire's single topic as a regular data topic.
    pub fn data_topic(&self) -> DataTopic {
        DataTopic {
            topic: self.topic.clone(),
            key_schema: self.key_schema.clone(),
            value_schema: self.value_schema.clone(),
            doc: Some(self.doc.clone()),
            ..DataTopic::default()
        }
    }
}

/// Active source backed by a standalone app rather than a questionnaire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AppActiveSource {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub app_provider: Option<String>,
    pub data: Vec<DataTopic>,
    #[serde(default)]
    pub register_schema: Option<bool>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub spec_path: PathBuf,
}

/// One sensor of a passive source. The topic declaration is inlined in the
/// definition file, so the fields flatten into [`DataTopic`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Sensor {
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(flatten)]
    pub topic: DataTopic,
}

/// Stream processor bundled with a passive source. Unlike a sensor it
/// reads an input topic and aggregates onto a separate output base.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Processor {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<SampleRate>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    pub input_topic: String,
    #[serde(rename = "input_key", default)]
    pub input_key_schema: Option<String>,
    #[serde(rename = "input_value")]
    pub input_value_schema: String,
    pub base_output_topic: String,
    #[serde(default)]
    pub aggregator: Option<String>,
}

impl Processor {
    /// Output topics over the processor's output base, one per window for a
    /// timed aggregator, a single `_output` topic otherwise.
    pub fn derive_topics(&self) -> Vec<Topic> {
        let names = if self
            .aggregator
            .as_deref()
            .is_some_and(is_timed_aggregator)
        {
            timed_topic_names(&self.base_output_topic)
        } else {
            vec![out_topic(&self.base_output_topic)]
        };
        names
            .into_iter()
            .map(|name| Topic {
                name,
                key_schema: self.input_key_schema.clone().unwrap_or_default(),
                value_schema: self.input_value_schema.clone(),
            })
            .collect()
    }

    /// All topic names the processor implies: outputs and state stores. The
    /// input topic belongs to the sensor that produces it.
    pub fn topic_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for output in self.derive_topics() {
            let store = state_store_name(&self.input_topic, &output.name);
            names.push(output.name);
            names.push(store);
        }
        names
    }
}

/// Passive source: a wearable or phone sensor bundle.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PassiveSource {
    pub vendor: String,
    pub model: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub app_provider: Option<String>,
    /// Defaults to `<vendor>_<model>` when not declared.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    pub sensors: Vec<Sensor>,
    #[serde(default)]
    pub processors: Vec<Processor>,
    #[serde(default)]
    pub register_schema: Option<bool>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub spec_path: PathBuf,
}

impl PassiveSource {
    /// Source name, derived from vendor and model when not declared.
    pub fn name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.vendor, self.model))
    }
}

/// Application or server monitor source.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MonitorSource {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub app_provider: Option<String>,
    pub data: Vec<DataTopic>,
    #[serde(default)]
    pub register_schema: Option<bool>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub spec_path: PathBuf,
}

/// Group of stream processors over other sources' topics.
///
/// Stream processors register their own schemas, so `register_schema`
/// defaults to false for this variant only.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct StreamGroup {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub master: Option<String>,
    pub data: Vec<StreamDataTopic>,
    #[serde(default)]
    pub register_schema: Option<bool>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub spec_path: PathBuf,
}

impl StreamGroup {
    /// Output names of the windowed streams in this group.
    pub fn timed_topic_names(&self) -> Vec<String> {
        self.data
            .iter()
            .flat_map(StreamDataTopic::timed_topic_names)
            .collect()
    }
}

/// Connector source bridging an external system into the platform.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ConnectorSource {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    pub data: Vec<DataTopic>,
    #[serde(default)]
    pub register_schema: Option<bool>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub spec_path: PathBuf,
}

/// Source pushing records in through an ingestion endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PushSource {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    pub data: Vec<DataTopic>,
    #[serde(default)]
    pub register_schema: Option<bool>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub spec_path: PathBuf,
}

/// One declared data producer, in any scope.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataProducer {
    Questionnaire(QuestionnaireSource),
    AppActive(AppActiveSource),
    Passive(PassiveSource),
    Monitor(MonitorSource),
    Stream(StreamGroup),
    Connector(ConnectorSource),
    Push(PushSource),
}

impl DataProducer {
    /// Name of the source, unique within its scope.
    pub fn name(&self) -> String {
        match self {
            DataProducer::Questionnaire(s) => s.name.clone(),
            DataProducer::AppActive(s) => s.name.clone(),
            DataProducer::Passive(s) => s.name(),
            DataProducer::Monitor(s) => s.name.clone(),
            DataProducer::Stream(s) => s.name.clone(),
            DataProducer::Connector(s) => s.name.clone(),
            DataProducer::Push(s) => s.name.clone(),
        }
    }

    /// Scope this producer belongs to, fixed per variant.
    pub fn scope(&self) -> Scope {
        match self {
            DataProducer::Questionnaire(_) | DataProducer::AppActive(_) => Scope::Active,
            DataProducer::Passive(_) => Scope::Passive,
            DataProducer::Monitor(_) => Scope::Monitor,
            DataProducer::Stream(_) => Scope::Stream,
            DataProducer::Connector(_) => Scope::Connector,
            DataProducer::Push(_) => Scope::Push,
        }
    }

    /// Whether schemas must be registered ahead of time for this producer.
    ///
    /// Stream groups default to false since the stream processor registers
    /// its own schemas; every other variant defaults to true.
    pub fn register_schema(&self) -> bool {
        let (declared, default) = match self {
            DataProducer::Questionnaire(s) => (s.register_schema, true),
            DataProducer::AppActive(s) => (s.register_schema, true),
            DataProducer::Passive(s) => (s.register_schema, true),
            DataProducer::Monitor(s) => (s.register_schema, true),
            DataProducer::Stream(s) => (s.register_schema, false),
            DataProducer::Connector(s) => (s.register_schema, true),
            DataProducer::Push(s) => (s.register_schema, true),
        };
        declared.unwrap_or(default)
    }

    /// Definition file this producer was parsed from.
    pub fn spec_path(&self) -> &Path {
        match self {
            DataProducer::Questionnaire(s) => &s.spec_path,
            DataProducer::AppActive(s) => &s.spec_path,
            DataProducer::Passive(s) => &s.spec_path,
            DataProducer::Monitor(s) => &s.spec_path,
            DataProducer::Stream(s) => &s.spec_path,
            DataProducer::Connector(s) => &s.spec_path,
            DataProducer::Push(s) => &s.spec_path,
        }
    }

    /// Raw input topics declared by this producer, before any derivation.
    pub fn raw_topic_names(&self) -> Vec<String> {
        match self {
            DataProducer::Questionnaire(s) => vec![s.topic.clone()],
            DataProducer::AppActive(s) => s.data.iter().map(|t| t.topic.clone()).collect(),
            DataProducer::Passive(s) => {
                s.sensors.iter().map(|sensor| sensor.topic.topic.clone()).collect()
            }
            DataProducer::Monitor(s) => s.data.iter().map(|t| t.topic.clone()).collect(),
            // Stream inputs belong to the producing source, not the stream.
            DataProducer::Stream(_) => Vec::new(),
            DataProducer::Connector(s) => s.data.iter().map(|t| t.topic.clone()).collect(),
            DataProducer::Push(s) => s.data.iter().map(|t| t.topic.clone()).collect(),
        }
    }

    /// Every topic name this producer implies, including aggregated outputs
    /// and state-store topics.
    pub fn topic_names(&self) -> Vec<String> {
        match self {
            DataProducer::Questionnaire(s) => s.data_topic().topic_names(),
            DataProducer::AppActive(s) => {
                s.data.iter().flat_map(DataTopic::topic_names).collect()
            }
            DataProducer::Passive(s) => {
                let mut names: Vec<String> = s
                    .sensors
                    .iter()
                    .flat_map(|sensor| sensor.topic.topic_names())
                    .collect();
                names.extend(s.processors.iter().flat_map(Processor::topic_names));
                names
            }
            DataProducer::Monitor(s) => {
                s.data.iter().flat_map(DataTopic::topic_names).collect()
            }
            DataProducer::Stream(s) => s
                .data
                .iter()
                .flat_map(StreamDataTopic::topic_names)
                .collect(),
            DataProducer::Connector(s) => {
                s.data.iter().flat_map(DataTopic::topic_names).collect()
            }
            DataProducer::Push(s) => s.data.iter().flat_map(DataTopic::topic_names).collect(),
        }
    }

    /// Topic names a result cache subscribes to: the final output of each
    /// declared topic. Aggregated topics contribute their outputs only,
    /// non-aggregated ones their raw topic.
    pub fn result_cache_names(&self) -> Vec<String> {
        match self {
            DataProducer::Questionnaire(s) => s.data_topic().result_cache_names(),
            DataProducer::AppActive(s) => {
                s.data.iter().flat_map(DataTopic::result_cache_names).collect()
            }
            DataProducer::Passive(s) => {
                let mut names: Vec<String> = s
                    .sensors
                    .iter()
                    .flat_map(|sensor| sensor.topic.result_cache_names())
                    .collect();
                names.extend(
                    s.processors
                        .iter()
                        .flat_map(|p| p.derive_topics().into_iter().map(|t| t.name)),
                );
                names
            }
            DataProducer::Monitor(s) => {
                s.data.iter().flat_map(DataTopic::result_cache_names).collect()
            }
            DataProducer::Stream(s) => s
                .data
                .iter()
                .flat_map(|topic| topic.derive_topics().into_iter().map(|t| t.name))
                .collect(),
            DataProducer::Connector(s) => {
                s.data.iter().flat_map(DataTopic::result_cache_names).collect()
            }
            DataProducer::Push(s) => {
                s.data.iter().flat_map(DataTopic::result_cache_names).collect()
            }
        }
    }

    /// Concrete topics with their key/value schema pairs.
    pub fn topics(&self) -> Vec<Topic> {
        match self {
            DataProducer::Questionnaire(s) => s.data_topic().derive_topics(),
            DataProducer::AppActive(s) => {
                s.data.iter().flat_map(DataTopic::derive_topics).collect()
            }
            DataProducer::Passive(s) => {
                let mut topics: Vec<Topic> = s
                    .sensors
                    .iter()
                    .flat_map(|sensor| sensor.topic.derive_topics())
                    .collect();
                topics.extend(s.processors.iter().flat_map(Processor::derive_topics));
                topics
            }
            DataProducer::Monitor(s) => {
                s.data.iter().flat_map(DataTopic::derive_topics).collect()
            }
            DataProducer::Stream(s) => s
                .data
                .iter()
                .flat_map(StreamDataTopic::derive_topics)
                .collect(),
            DataProducer::Connector(s) => {
                s.data.iter().flat_map(DataTopic::derive_topics).collect()
            }
            DataProducer::Push(s) => s.data.iter().flat_map(DataTopic::derive_topics).collect(),
        }
    }
}
