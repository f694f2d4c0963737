//! Structural rules over a loaded catalogue.
//!
//! These check declaration-level consistency: name uniqueness, passive
//! file naming, non-empty sensor and topic lists, and topic-name syntax.
//! Schema placement is checked separately in [`crate::validation::schema`].

use crate::catalogue::index::Catalogue;
use crate::catalogue::model::DataProducer;
use crate::validation::{Rule, ValidationException};
use std::collections::BTreeSet;
use std::path::Path;

/// Kafka's limit on topic name length.
const MAX_TOPIC_LENGTH: usize = 249;

/// The full structural rule set, in reporting order.
pub fn rules<'a>() -> Vec<Rule<'a, &'a Catalogue>> {
    vec![
        Box::new(|catalogue| unique_source_names(catalogue)),
        Box::new(|catalogue| passive_names_match_files(catalogue)),
        Box::new(|catalogue| declaration_lists(catalogue)),
        Box::new(|catalogue| topic_name_syntax(catalogue)),
    ]
}

/// Run every structural rule against one catalogue.
pub fn validate(catalogue: &Catalogue) -> Vec<ValidationException> {
    crate::validation::run_rules(&rules(), &[catalogue])
}

fn source_target(producer: &DataProducer) -> String {
    format!("{}/{}", producer.scope(), producer.name())
}

/// Source names must be unique within their scope.
fn unique_source_names(catalogue: &Catalogue) -> Vec<ValidationException> {
    let mut seen = BTreeSet::new();
    let mut violations = Vec::new();
    for producer in catalogue.sources() {
        if !seen.insert((producer.scope(), producer.name())) {
            violations.push(ValidationException::new(
                source_target(producer),
                "source name is declared more than once in this scope",
            ));
        }
    }
    violations
}

/// A passive source's `vendor_model` name must match its defining file.
fn passive_names_match_files(catalogue: &Catalogue) -> Vec<ValidationException> {
    let mut violations = Vec::new();
    for producer in catalogue.sources() {
        let DataProducer::Passive(source) = producer else {
            continue;
        };
        let expected = source.name();
        if !file_stem_matches(&source.spec_path, &expected) {
            violations.push(ValidationException::new(
                source.spec_path.display().to_string(),
                format!(
                    "vendor and model must match the file name; expected '{}.yml'",
                    expected.to_lowercase()
                ),
            ));
        }
    }
    violations
}

fn file_stem_matches(path: &Path, expected: &str) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.eq_ignore_ascii_case(expected))
}

/// Sensor, processor, and topic lists must be non-empty and collision-free.
fn declaration_lists(catalogue: &Catalogue) -> Vec<ValidationException> {
    let mut violations = Vec::new();
    for producer in catalogue.sources() {
        let target = source_target(producer);
        match producer {
            DataProducer::Passive(source) => {
                if source.sensors.is_empty() {
                    violations.push(ValidationException::new(
                        target.clone(),
                        "passive source declares no sensors",
                    ));
                }
                violations.extend(name_collisions(
                    &target,
                    "sensor",
                    source.sensors.iter().map(|sensor| sensor.name.as_str()),
                ));
                violations.extend(name_collisions(
                    &target,
                    "processor",
                    source.processors.iter().map(|p| p.name.as_str()),
                ));
            }
            DataProducer::Questionnaire(source) => {
                if source.questions.is_empty() {
                    violations.push(ValidationException::new(
                        target,
                        "questionnaire declares no questions",
                    ));
                }
            }
            _ => {
                if producer.topic_names().is_empty() {
                    violations.push(ValidationException::new(
                        target,
                        "source declares no data topics",
                    ));
                }
            }
        }
    }
    violations
}

fn name_collisions<'a>(
    target: &str,
    kind: &str,
    names: impl Iterator<Item = &'a str>,
) -> Vec<ValidationException> {
    let mut seen = BTreeSet::new();
    let mut violations = Vec::new();
    for name in names {
        if !seen.insert(name) {
            violations.push(ValidationException::new(
                target.to_string(),
                format!("duplicate {kind} name '{name}'"),
            ));
        }
    }
    violations
}

/// Every derived topic name must be valid for the messaging system.
fn topic_name_syntax(catalogue: &Catalogue) -> Vec<ValidationException> {
    let mut violations = Vec::new();
    for producer in catalogue.sources() {
        let target = source_target(producer);
        for name in producer.topic_names() {
            if !is_valid_topic(&name) {
                violations.push(ValidationException::new(
                    target.clone(),
                    format!("topic name '{name}' is invalid"),
                ));
            }
        }
    }
    violations
}

/// Whether a topic name is acceptable to the messaging system.
///
/// Names are snake_case: a leading letter, lowercase alphanumeric segments
/// separated by underscores. Mixed case is tolerated after a separator so
/// derived state-store names remain valid.
pub fn is_valid_topic(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_TOPIC_LENGTH {
        return false;
    }
    let mut segments = name.split('_');
    let Some(first) = segments.next() else {
        return false;
    };
    let mut chars = first.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return false;
    }
    segments.all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::model::{PassiveSource, Sensor};
    use crate::catalogue::topic::DataTopic;
    use std::path::PathBuf;

    fn sensor(name: &str, topic: &str) -> Sensor {
        Sensor {
            name: name.to_string(),
            topic: DataTopic {
                topic: topic.to_string(),
                value_schema: "org.example.passive.device.Reading".to_string(),
                ..DataTopic::default()
            },
            ..Sensor::default()
        }
    }

    fn passive(vendor: &str, model: &str, file: &str) -> PassiveSource {
        PassiveSource {
            vendor: vendor.to_string(),
            model: model.to_string(),
            sensors: vec![sensor("ACCELEROMETER", "device_acceleration")],
            spec_path: PathBuf::from(file),
            ..PassiveSource::default()
        }
    }

    #[test]
    fn matching_passive_file_name_passes() {
        let catalogue = Catalogue::new(vec![DataProducer::Passive(passive(
            "Empatica",
            "E4",
            "/catalog/specifications/passive/empatica_e4.yml",
        ))]);
        assert!(validate(&catalogue).is_empty());
    }

    #[test]
    fn renamed_passive_file_reports_one_violation() {
        let catalogue = Catalogue::new(vec![DataProducer::Passive(passive(
            "Empatica",
            "E4",
            "/catalog/specifications/passive/empatica_e5.yml",
        ))]);
        let violations = validate(&catalogue);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("empatica_e4.yml"));
    }

    #[test]
    fn empty_sensor_list_and_duplicates_are_reported() {
        let mut source = passive(
            "Empatica",
            "E4",
            "/catalog/specifications/passive/empatica_e4.yml",
        );
        source.sensors.clear();
        let catalogue = Catalogue::new(vec![DataProducer::Passive(source)]);
        let violations = validate(&catalogue);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("no sensors"));

        let mut source = passive(
            "Empatica",
            "E4",
            "/catalog/specifications/passive/empatica_e4.yml",
        );
        source
            .sensors
            .push(sensor("ACCELEROMETER", "device_acceleration_2"));
        let catalogue = Catalogue::new(vec![DataProducer::Passive(source)]);
        let violations = validate(&catalogue);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("duplicate sensor"));
    }

    #[test]
    fn invalid_topic_names_are_reported_per_topic() {
        let mut source = passive(
            "Empatica",
            "E4",
            "/catalog/specifications/passive/empatica_e4.yml",
        );
        source.sensors = vec![
            sensor("ACCELEROMETER", "Device__Acceleration"),
            sensor("BATTERY", "device_battery"),
        ];
        let catalogue = Catalogue::new(vec![DataProducer::Passive(source)]);
        let violations = validate(&catalogue);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Device__Acceleration"));
    }

    #[test]
    fn topic_syntax_accepts_derived_state_store_names() {
        assert!(is_valid_topic("android_phone_usage_event"));
        assert!(is_valid_topic(
            "From-device_acceleration-To-device_acceleration_10sec"
        ));
        assert!(!is_valid_topic("_leading_underscore"));
        assert!(!is_valid_topic("double__underscore"));
        assert!(!is_valid_topic(""));
        assert!(!is_valid_topic(&"a".repeat(250)));
    }
}
