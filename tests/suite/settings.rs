//! Settings resolved from a config file drive a real batch run.

use std::io::Write;

use cutoff_config::{BatchSettings, ConfigError, CutoffConfig, EnvOverrides, ReportFormat};
use cutoff_core::OperationTimings;
use cutoff_types::{BatchStop, RecordIndex};

use crate::common::{Harness, millis};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test(start_paused = true)]
async fn config_file_settings_bound_the_batch() {
    let file = write_config(
        r#"
        [batch]
        records = 10
        deadline_ms = 350

        [operations]
        write_ms = 40
        update_ms = 100

        [output]
        format = "json"
        "#,
    );
    let config = CutoffConfig::load_from(file.path()).unwrap();
    let settings = BatchSettings::resolve(config.as_ref(), &EnvOverrides::default()).unwrap();
    assert_eq!(settings.format, ReportFormat::Json);

    let harness = Harness::new(OperationTimings::new(settings.write, settings.update));
    let report = harness
        .driver
        .run(settings.records, settings.deadline)
        .await
        .unwrap();

    // 100ms per record: records 0..=2 finish by 300ms, record 3 is cut at 350ms.
    assert_eq!(report.cancelled_at(), Some(RecordIndex::new(3)));
    assert_eq!(report.fully_completed_count(), 3);
    assert_eq!(report.deadline, millis(350));
    harness.assert_effects_match(&report);
}

#[tokio::test(start_paused = true)]
async fn env_overrides_take_precedence_over_file() {
    let file = write_config("[batch]\nrecords = 10\ndeadline_ms = 100\n");
    let config = CutoffConfig::load_from(file.path()).unwrap();
    let env = EnvOverrides {
        records: Some("2".to_string()),
        deadline_ms: Some("60000".to_string()),
        ..EnvOverrides::default()
    };
    let settings = BatchSettings::resolve(config.as_ref(), &env).unwrap();

    let harness = Harness::new(OperationTimings::new(settings.write, settings.update));
    let report = harness
        .driver
        .run(settings.records, settings.deadline)
        .await
        .unwrap();

    assert_eq!(report.stop, BatchStop::Exhausted);
    assert_eq!(report.processed_count(), 2);
}

#[test]
fn misconfiguration_is_reported_before_running() {
    let file = write_config("[batch]\nrecords = -3\n");
    let config = CutoffConfig::load_from(file.path()).unwrap();

    let err = BatchSettings::resolve(config.as_ref(), &EnvOverrides::default()).unwrap_err();

    assert!(matches!(err, ConfigError::Negative { value: -3, .. }));
}
