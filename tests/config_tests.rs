//! Tests for loading aggregator configuration from files

use stayboard::config::AggregatorConfig;
use stayboard::entities::{AppointmentStatus, BookingStatus};
use stayboard::status::StatusClassifier;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_test::assert_ok;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_overrides_from_file() {
    let file = write_config(
        r#"
placeholder: "n/a"
date_format: "%Y-%m-%d"
labels:
  bookings:
    checked_in:
      label: "Đã nhận phòng"
      color: "badge-blue"
  relative_time:
    hours_ago: "{n}h"
"#,
    );

    let config = assert_ok!(AggregatorConfig::from_yaml_file(file.path().to_str().unwrap()));
    assert_eq!(config.placeholder, "n/a");
    assert_eq!(config.event_capacity, 256);

    let classifier = StatusClassifier::from_config(&config);
    let badge = classifier.classify_booking(BookingStatus::CheckedIn);
    assert_eq!(badge.label, "Đã nhận phòng");
    assert_eq!(badge.color, "badge-blue");

    // Untouched sections keep their defaults
    let pending = classifier
        .classify_appointment(AppointmentStatus::NoProgress)
        .unwrap();
    assert_eq!(pending.badge.label, "Pending");

    let start = "2025-01-10T09:00:00Z".parse().unwrap();
    let later = "2025-01-10T14:30:00Z".parse().unwrap();
    assert_eq!(classifier.relative_time(start, later), "5h");
    assert_eq!(classifier.absolute_time(start), "2025-01-10");
}

#[test]
fn test_empty_file_is_default() {
    let file = write_config("{}");

    let config = assert_ok!(AggregatorConfig::from_yaml_file(file.path().to_str().unwrap()));
    assert_eq!(config, AggregatorConfig::default_config());
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");

    assert!(AggregatorConfig::from_yaml_file(path.to_str().unwrap()).is_err());
}

#[test]
fn test_malformed_badge_fails() {
    let file = write_config(
        r#"
labels:
  appointments:
    pending: "not a badge"
"#,
    );

    assert!(AggregatorConfig::from_yaml_file(file.path().to_str().unwrap()).is_err());
}
