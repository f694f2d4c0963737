//! Declared topic model and concrete topic derivation.
//!
//! A declared topic expands into one or more concrete Kafka topics: the raw
//! input topic, and for aggregated topics one output per fixed time window
//! plus the changelog ("state store") topic pairing input and output.
//! Derivation is pure and deterministic; re-deriving from the same
//! declaration always yields the same names in the same order.

use serde::{Deserialize, Serialize};

/// Suffix appended to a base name for non-windowed aggregated outputs.
pub const OUTPUT_LABEL: &str = "_output";

const FROM_LABEL: &str = "From-";
const TO_LABEL: &str = "-To-";

// Aggregator classes that produce one rollup per fixed time window. Any
// other aggregator produces a single output topic.
const TIMED_AGGREGATORS: [&str; 2] = ["AggregatorDouble", "AggregatorDoubleArray"];

/// Fixed time windows for aggregated output topics.
///
/// The declaration order here is the derivation order; it is never sorted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TimeWindow {
    TenSecond,
    ThirtySecond,
    OneMin,
    TenMin,
    OneHour,
    OneDay,
    OneWeek,
}

/// All windows, in derivation order.
pub const ALL_WINDOWS: [TimeWindow; 7] = [
    TimeWindow::TenSecond,
    TimeWindow::ThirtySecond,
    TimeWindow::OneMin,
    TimeWindow::TenMin,
    TimeWindow::OneHour,
    TimeWindow::OneDay,
    TimeWindow::OneWeek,
];

impl TimeWindow {
    /// Fixed topic-name suffix for this window.
    pub fn suffix(&self) -> &'static str {
        match self {
            TimeWindow::TenSecond => "_10sec",
            TimeWindow::ThirtySecond => "_30sec",
            TimeWindow::OneMin => "_1min",
            TimeWindow::TenMin => "_10min",
            TimeWindow::OneHour => "_1hour",
            TimeWindow::OneDay => "_1day",
            TimeWindow::OneWeek => "_1week",
        }
    }

    /// Window length in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        match self {
            TimeWindow::TenSecond => 10_000,
            TimeWindow::ThirtySecond => 30_000,
            TimeWindow::OneMin => 60_000,
            TimeWindow::TenMin => 600_000,
            TimeWindow::OneHour => 3_600_000,
            TimeWindow::OneDay => 86_400_000,
            TimeWindow::OneWeek => 604_800_000,
        }
    }

    /// Output topic name for `base` in this window.
    pub fn topic_name(&self, base: &str) -> String {
        format!("{base}{}", self.suffix())
    }
}

/// Default output topic for a non-windowed aggregated base name.
pub fn out_topic(base: &str) -> String {
    format!("{base}{OUTPUT_LABEL}")
}

/// Output topic names for `base`, one per fixed window, in window order.
pub fn timed_topic_names(base: &str) -> Vec<String> {
    ALL_WINDOWS.iter().map(|w| w.topic_name(base)).collect()
}

/// Changelog topic name pairing a stream's input and output topics.
///
/// The name is directional: `From-<input>-To-<output>`.
///
/// # Panics
///
/// Panics when either name is empty; a partial state-store name would
/// silently corrupt the derived topic set.
pub fn state_store_name(input: &str, output: &str) -> String {
    assert!(!input.is_empty(), "state store requires an input topic");
    assert!(!output.is_empty(), "state store requires an output topic");
    format!("{FROM_LABEL}{input}{TO_LABEL}{output}")
}

/// Recover the window length in milliseconds from a windowed topic name.
///
/// # Panics
///
/// Panics when `topic` does not end in one of the fixed window suffixes.
/// The suffix vocabulary is closed, so an unrecognized suffix is a caller
/// bug rather than a recoverable condition.
pub fn time_interval(topic: &str) -> u64 {
    for window in ALL_WINDOWS {
        if topic.ends_with(window.suffix()) {
            return window.interval_ms();
        }
    }
    panic!("topic '{topic}' does not carry a known time-window suffix");
}

/// One concrete topic with its key/value schema pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Topic {
    pub name: String,
    pub key_schema: String,
    pub value_schema: String,
}

/// Expected message cadence for a topic, as declared.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SampleRate {
    /// Mean interval between records, in seconds.
    #[serde(default)]
    pub interval: Option<f64>,
    /// Mean frequency of records, in Hz.
    #[serde(default)]
    pub frequency: Option<f64>,
    /// Whether the rate varies at runtime.
    #[serde(default)]
    pub dynamic: bool,
}

/// Record field a declared unit applies to.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DataField {
    pub name: String,
}

/// One declared topic owned by a data producer.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DataTopic {
    /// Raw topic the producer writes to.
    pub topic: String,
    /// Key schema identifier; the loader fills the platform default when
    /// absent.
    #[serde(rename = "key", default)]
    pub key_schema: Option<String>,
    #[serde(rename = "value")]
    pub value_schema: String,
    /// Aggregator class processing this topic, if any.
    #[serde(default)]
    pub aggregator: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<SampleRate>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub fields: Vec<DataField>,
    #[serde(default)]
    pub app_provider: Option<String>,
    #[serde(default)]
    pub processing_state: Option<String>,
}

/// Whether an aggregator class produces per-window rollups.
///
/// Only the final path segment is significant so both shorthand and
/// group-expanded references match.
pub fn is_timed_aggregator(aggregator: &str) -> bool {
    let basename = aggregator.rsplit('.').next().unwrap_or(aggregator);
    TIMED_AGGREGATORS.contains(&basename)
}

impl DataTopic {
    fn timed(&self) -> bool {
        self.aggregator.as_deref().is_some_and(is_timed_aggregator)
    }

    /// Key schema identifier, if already resolved by the loader.
    pub fn key_schema(&self) -> &str {
        self.key_schema.as_deref().unwrap_or_default()
    }

    /// Concrete output topics implied by this declaration.
    ///
    /// A timed aggregator yields one topic per fixed window; any other
    /// aggregator yields the single `_output` topic; without an aggregator
    /// the declared raw topic is the only one.
    pub fn derive_topics(&self) -> Vec<Topic> {
        let names = if self.timed() {
            timed_topic_names(&self.topic)
        } else if self.aggregator.is_some() {
            vec![out_topic(&self.topic)]
        } else {
            vec![self.topic.clone()]
        };
        names
            .into_iter()
            .map(|name| Topic {
                name,
                key_schema: self.key_schema().to_string(),
                value_schema: self.value_schema.clone(),
            })
            .collect()
    }

    /// Changelog topic names for the aggregated outputs, in output order.
    pub fn state_store_names(&self) -> Vec<String> {
        if self.aggregator.is_none() {
            return Vec::new();
        }
        self.derive_topics()
            .iter()
            .map(|out| state_store_name(&self.topic, &out.name))
            .collect()
    }

    /// Every topic name this declaration implies: the raw topic, aggregated
    /// outputs, and their state stores.
    pub fn topic_names(&self) -> Vec<String> {
        let mut names = vec![self.topic.clone()];
        if self.aggregator.is_some() {
            names.extend(self.derive_topics().into_iter().map(|t| t.name));
            names.extend(self.state_store_names());
        }
        names
    }

    /// Topic names a result cache subscribes to: the aggregated outputs
    /// when an aggregator is declared, the raw topic otherwise.
    pub fn result_cache_names(&self) -> Vec<String> {
        if self.aggregator.is_some() {
            self.derive_topics().into_iter().map(|t| t.name).collect()
        } else {
            vec![self.topic.clone()]
        }
    }
}

/// Topic declaration for a stream processor.
///
/// Stream topics read from other producers' topics and only own their
/// outputs: windowed streams derive one output per fixed window from
/// `topic_base`, non-windowed streams a single `_output` topic unless an
/// explicit name overrides it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct StreamDataTopic {
    /// Whether outputs are produced per fixed time window.
    #[serde(default)]
    pub windowed: bool,
    /// Single-input shorthand; folded into `input_topics` by the loader.
    /// Declaring both forms is a load error.
    #[serde(default, skip_serializing)]
    pub input_topic: Option<String>,
    /// Input topics read by the stream.
    #[serde(default)]
    pub input_topics: Vec<String>,
    /// Base name for derived output topics; defaults to the input topic.
    #[serde(default)]
    pub topic_base: Option<String>,
    /// Explicit output topic name for non-windowed streams.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(rename = "key", default)]
    pub key_schema: Option<String>,
    #[serde(rename = "value")]
    pub value_schema: String,
    #[serde(default)]
    pub doc: Option<String>,
}

impl StreamDataTopic {
    /// Base name that derived output topics extend.
    pub fn base(&self) -> &str {
        self.topic_base
            .as_deref()
            .or_else(|| self.input_topics.first().map(String::as_str))
            .unwrap_or_default()
    }

    /// Key schema identifier, if already resolved by the loader.
    pub fn key_schema(&self) -> &str {
        self.key_schema.as_deref().unwrap_or_default()
    }

    /// Concrete output topics implied by this declaration.
    pub fn derive_topics(&self) -> Vec<Topic> {
        let names = if self.windowed {
            timed_topic_names(self.base())
        } else {
            vec![
                self.topic
                    .clone()
                    .unwrap_or_else(|| out_topic(self.base())),
            ]
        };
        names
            .into_iter()
            .map(|name| Topic {
                name,
                key_schema: self.key_schema().to_string(),
                value_schema: self.value_schema.clone(),
            })
            .collect()
    }

    /// Windowed output names only; empty for non-windowed streams.
    pub fn timed_topic_names(&self) -> Vec<String> {
        if self.windowed {
            timed_topic_names(self.base())
        } else {
            Vec::new()
        }
    }

    /// Changelog topic names pairing the stream input with each output.
    pub fn state_store_names(&self) -> Vec<String> {
        let Some(input) = self.input_topics.first() else {
            return Vec::new();
        };
        self.derive_topics()
            .iter()
            .map(|out| state_store_name(input, &out.name))
            .collect()
    }

    /// Every topic name this stream owns: outputs plus state stores. Input
    /// topics belong to the upstream producer and are not repeated here.
    pub fn topic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.derive_topics().into_iter().map(|t| t.name).collect();
        names.extend(self.state_store_names());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_topic(name: &str) -> DataTopic {
        DataTopic {
            topic: name.to_string(),
            key_schema: Some("org.example.kafka.MeasurementKey".to_string()),
            value_schema: "org.example.passive.sensor.SensorReading".to_string(),
            ..DataTopic::default()
        }
    }

    #[test]
    fn windowed_stream_derives_one_topic_per_window() {
        let topic = StreamDataTopic {
            windowed: true,
            input_topics: vec!["sensor_acceleration".to_string()],
            topic_base: Some("sensor_acceleration".to_string()),
            value_schema: "org.example.stream.Rollup".to_string(),
            ..StreamDataTopic::default()
        };

        let derived = topic.derive_topics();
        assert_eq!(derived.len(), 7);
        let names: Vec<&str> = derived.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "sensor_acceleration_10sec",
                "sensor_acceleration_30sec",
                "sensor_acceleration_1min",
                "sensor_acceleration_10min",
                "sensor_acceleration_1hour",
                "sensor_acceleration_1day",
                "sensor_acceleration_1week",
            ]
        );
        // Derivation must be idempotent.
        assert_eq!(topic.derive_topics(), derived);
    }

    #[test]
    fn explicit_topic_wins_for_non_windowed_stream() {
        let topic = StreamDataTopic {
            input_topics: vec!["sensor_battery".to_string()],
            topic_base: Some("sensor_battery".to_string()),
            topic: Some("battery_summary".to_string()),
            value_schema: "org.example.stream.BatterySummary".to_string(),
            ..StreamDataTopic::default()
        };
        let names: Vec<String> = topic.derive_topics().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["battery_summary".to_string()]);
    }

    #[test]
    fn non_windowed_stream_defaults_to_output_suffix() {
        let topic = StreamDataTopic {
            input_topics: vec!["sensor_battery".to_string()],
            topic_base: Some("sensor_battery".to_string()),
            value_schema: "org.example.stream.BatterySummary".to_string(),
            ..StreamDataTopic::default()
        };
        let names: Vec<String> = topic.derive_topics().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["sensor_battery_output".to_string()]);
    }

    #[test]
    fn timed_aggregator_expands_plain_topic() {
        let mut topic = plain_topic("device_heart_rate");
        topic.aggregator = Some("org.example.kafka.aggregator.AggregatorDouble".to_string());

        let derived = topic.derive_topics();
        assert_eq!(derived.len(), 7);
        assert_eq!(derived[0].name, "device_heart_rate_10sec");

        let stores = topic.state_store_names();
        assert_eq!(stores.len(), 7);
        assert_eq!(
            stores[0],
            "From-device_heart_rate-To-device_heart_rate_10sec"
        );

        let all = topic.topic_names();
        assert_eq!(all.len(), 15);
        assert_eq!(all[0], "device_heart_rate");
    }

    #[test]
    fn non_timed_aggregator_derives_single_output() {
        let mut topic = plain_topic("device_events");
        topic.aggregator = Some("org.example.kafka.aggregator.AggregatorObject".to_string());

        let names: Vec<String> = topic.derive_topics().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["device_events_output".to_string()]);
        assert_eq!(
            topic.state_store_names(),
            vec!["From-device_events-To-device_events_output".to_string()]
        );
    }

    #[test]
    fn plain_topic_derives_itself() {
        let topic = plain_topic("device_events");
        let names: Vec<String> = topic.derive_topics().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["device_events".to_string()]);
        assert!(topic.state_store_names().is_empty());
        assert_eq!(topic.topic_names(), vec!["device_events".to_string()]);
    }

    #[test]
    fn interval_round_trips_for_every_window() {
        for window in ALL_WINDOWS {
            let name = window.topic_name("base");
            assert_eq!(time_interval(&name), window.interval_ms());
        }
    }

    #[test]
    #[should_panic(expected = "does not carry a known time-window suffix")]
    fn interval_rejects_unknown_suffix() {
        time_interval("base_10secs");
    }

    #[test]
    fn state_store_name_is_directional() {
        let ab = state_store_name("a", "b");
        let ba = state_store_name("b", "a");
        assert_eq!(ab, "From-a-To-b");
        assert_ne!(ab, ba);
    }

    #[test]
    #[should_panic(expected = "requires an input topic")]
    fn state_store_name_rejects_empty_input() {
        state_store_name("", "out");
    }

    #[test]
    #[should_panic(expected = "requires an output topic")]
    fn state_store_name_rejects_empty_output() {
        state_store_name("in", "");
    }
}
