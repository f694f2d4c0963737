//! Fixture catalog trees shared by the integration suite.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("fixture path has a parent")).expect("create dirs");
    fs::write(path, contents).expect("write fixture file");
}

/// Build a small but complete catalog root: definitions for every source
/// scope plus a matching commons tree.
pub fn fixture_catalog() -> TempDir {
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path();

    write_file(
        root,
        "specifications/active/phq8.yml",
        r#"assessment_type: QUESTIONNAIRE
name: PHQ8
topic: questionnaire_phq8
value: .active.questionnaire.Questionnaire
doc: Depression screening questionnaire.
questions:
  - lead: Over the past two weeks,
    content: how often have you had little interest in doing things?
    responses:
      - text: Not at all
        score: 0
      - text: Several days
        score: 1
"#,
    );

    write_file(
        root,
        "specifications/passive/empatica_e4.yml",
        r#"vendor: Empatica
model: E4
version: 1.1.0
app_provider: .empatica.E4Provider
sensors:
  - name: ACCELEROMETER
    topic: device_empatica_e4_acceleration
    value: .passive.empatica.EmpaticaE4Acceleration
    sample_rate:
      frequency: 32.0
  - name: BATTERY
    topic: device_empatica_e4_battery_level
    value: .passive.empatica.EmpaticaE4BatteryLevel
    aggregator: .kafka.aggregator.AggregatorDouble
processors:
  - name: TEMPERATURE
    input_topic: device_empatica_e4_temperature
    input_value: .passive.empatica.EmpaticaE4Temperature
    base_output_topic: device_empatica_e4_temperature_stats
    aggregator: .kafka.aggregator.AggregatorDouble
"#,
    );

    write_file(
        root,
        "specifications/monitor/application_status.yml",
        r#"name: application_status
app_provider: .monitor.ApplicationStatusProvider
data:
  - topic: application_uptime
    value: .monitor.application.ApplicationUptime
"#,
    );

    write_file(
        root,
        "specifications/stream/acceleration_stream.yml",
        r#"name: acceleration_stream
master: acceleration
data:
  - input_topic: device_empatica_e4_acceleration
    windowed: true
    value: .stream.aggregator.AggregateList
  - input_topic: application_uptime
    topic: application_uptime_summary
    value: .stream.UptimeSummary
"#,
    );

    write_file(
        root,
        "specifications/connector/fitness_api.yml",
        r#"name: fitness_api
data:
  - topic: connect_fitness_steps
    value: .connector.fitness.FitnessSteps
"#,
    );

    write_file(
        root,
        "specifications/push/webhook.yml",
        r#"name: webhook
data:
  - topic: push_webhook_event
    value: .push.WebhookEvent
"#,
    );

    write_file(
        root,
        "commons/passive/empatica/empatica_e4_acceleration.avsc",
        r#"{
  "type": "record",
  "name": "EmpaticaE4Acceleration",
  "namespace": "org.sensenet.passive.empatica",
  "doc": "Acceleration sampled by the wristband.",
  "fields": []
}"#,
    );

    write_file(
        root,
        "commons/monitor/application/application_uptime.avsc",
        r#"{
  "type": "record",
  "name": "ApplicationUptime",
  "namespace": "org.sensenet.monitor.application",
  "fields": []
}"#,
    );

    temp
}
