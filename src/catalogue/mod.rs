//! Source catalogue: declared producers, their topics, and loading.

pub mod identity;
pub mod index;
pub mod loader;
pub mod model;
pub mod topic;

pub use identity::{ALL_SCOPES, Scope};
pub use index::Catalogue;
pub use loader::{SPECIFICATIONS_PATH, load_catalogue};
pub use model::{
    AppActiveSource, ConnectorSource, DataProducer, MonitorSource, PassiveSource, Processor,
    PushSource, Question, QuestionnaireSource, Response, Sensor, StreamGroup,
};
pub use topic::{
    ALL_WINDOWS, DataTopic, SampleRate, StreamDataTopic, TimeWindow, Topic, is_timed_aggregator,
    out_topic, state_store_name, time_interval, timed_topic_names,
};
