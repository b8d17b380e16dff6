//! Tests for TOML configuration and settings resolution

use crate::app::cli::args::Args;
use crate::app::cli::config::*;
use crate::app::cli::error::ConfigError;
use crate::booking::api::{BookingError, HourRange, SchedulerConfig, WeeklyTemplate};
use chrono::{Duration, Weekday};
use std::io::Write;
use std::path::PathBuf;

fn table(text: &str) -> toml::Table {
    toml::from_str::<toml::Table>(text).unwrap()
}

fn apply(text: &str) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();
    settings.apply_toml_values(&table(text))?;
    Ok(settings)
}

fn invalid_key(result: Result<Settings, ConfigError>) -> String {
    match result {
        Err(ConfigError::InvalidValue { key, .. }) => key,
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.scheduler, SchedulerConfig::default());
    assert_eq!(settings.template, WeeklyTemplate::default());
    assert_eq!(
        settings.expiry_sweep,
        std::time::Duration::from_secs(DEFAULT_EXPIRY_SWEEP_SECONDS)
    );
    assert!(settings.services.is_none());
}

#[test]
fn test_top_level_values() {
    let settings = apply(
        r#"
        masters = ["olga", "irina"]
        user = "anna"
        data-file = "/var/lib/salon.json"
        log-level = "warn"
        log-format = "ext"
        no-color = true
        slot-granularity-minutes = 30
        proposal-grace-minutes = 10
        input-timeout-seconds = 120
        expiry-sweep-seconds = 5
        "#,
    )
    .unwrap();

    assert_eq!(settings.masters, vec!["olga", "irina"]);
    assert!(settings.is_master("irina"));
    assert!(!settings.is_master("anna"));
    assert_eq!(settings.user.as_deref(), Some("anna"));
    assert_eq!(settings.data_file, Some(PathBuf::from("/var/lib/salon.json")));
    assert_eq!(settings.log_level.as_deref(), Some("warn"));
    assert_eq!(settings.log_format.as_deref(), Some("ext"));
    assert_eq!(settings.color, Some(false));
    assert_eq!(settings.scheduler.slot_granularity_minutes, 30);
    assert_eq!(settings.scheduler.proposal_grace, Duration::minutes(10));
    assert_eq!(settings.scheduler.input_timeout, Duration::seconds(120));
    assert_eq!(settings.expiry_sweep, std::time::Duration::from_secs(5));
}

#[test]
fn test_data_file_none_disables_persistence() {
    let settings = apply(r#"data-file = "none""#).unwrap();
    assert_eq!(settings.data_file, None);
}

#[test]
fn test_masters_as_comma_string() {
    let settings = apply(r#"masters = "olga,irina""#).unwrap();
    assert_eq!(settings.masters, vec!["olga", "irina"]);
}

#[test]
fn test_invalid_numbers() {
    assert_eq!(invalid_key(apply("slot-granularity-minutes = 0")), "slot-granularity-minutes");
    assert_eq!(invalid_key(apply("slot-granularity-minutes = 2000")), "slot-granularity-minutes");
    assert_eq!(invalid_key(apply("proposal-grace-minutes = -5")), "proposal-grace-minutes");
    assert_eq!(invalid_key(apply(r#"input-timeout-seconds = "soon""#)), "input-timeout-seconds");
}

#[test]
fn test_schedule_table() {
    let settings = apply(
        r#"
        [schedule]
        work-hours = "9-18"
        break-hours = "12-13"
        work-days = ["mon", "wed", "fri"]
        "#,
    )
    .unwrap();

    assert_eq!(settings.template.work_hours, HourRange::new(9, 18));
    assert_eq!(settings.template.break_hours, Some(HourRange::new(12, 13)));
    assert_eq!(
        settings.template.work_days,
        vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
    );
}

#[test]
fn test_schedule_without_break() {
    let settings = apply("[schedule]\nbreak-hours = false").unwrap();
    assert_eq!(settings.template.break_hours, None);

    let settings = apply("[schedule]\nbreak-hours = \"none\"").unwrap();
    assert_eq!(settings.template.break_hours, None);
}

#[test]
fn test_invalid_schedule() {
    assert_eq!(invalid_key(apply("[schedule]\nwork-hours = \"ten-six\"")), "work-hours");
    assert_eq!(invalid_key(apply("[schedule]\nwork-hours = 10")), "work-hours");
    assert_eq!(invalid_key(apply("[schedule]\nwork-days = [\"funday\"]")), "work-days");
    // break outside the new work hours
    assert_eq!(
        invalid_key(apply("[schedule]\nwork-hours = \"14-20\"")),
        "schedule"
    );
    assert_eq!(invalid_key(apply("schedule = 3")), "schedule");
}

#[test]
fn test_service_seeds() {
    let settings = apply(
        r#"
        [[service]]
        name = "Spa pedicure"
        price = 3000
        duration = 90

        [[service]]
        name = "French manicure"
        price = 2000
        duration = 60
        "#,
    )
    .unwrap();

    let seeds = settings.services.clone().unwrap();
    assert_eq!(
        seeds[0],
        ServiceSeed {
            name: "Spa pedicure".to_string(),
            price: 3000,
            duration: 90,
        }
    );

    let catalog = settings.build_catalog().unwrap();
    let services = catalog.list_services().unwrap();
    assert_eq!(services.len(), 2);
    assert!(services.iter().any(|s| s.name == "French manicure" && s.duration_minutes == 60));
}

#[test]
fn test_service_seed_errors() {
    assert_eq!(
        invalid_key(apply("[[service]]\nname = \"Nails\"\nprice = 100")),
        "service[0]"
    );

    let settings = apply("[[service]]\nname = \"Nails\"\nprice = -1\nduration = 30").unwrap();
    assert!(matches!(
        settings.build_catalog(),
        Err(BookingError::Validation { .. })
    ));
}

#[test]
fn test_default_catalog_without_seeds() {
    let catalog = Settings::default().build_catalog().unwrap();
    assert_eq!(catalog.list_services().unwrap().len(), 3);
}

#[test]
fn test_args_override_file() {
    let mut settings = apply(
        r#"
        masters = ["olga"]
        user = "anna"
        log-level = "warn"
        color = true
        "#,
    )
    .unwrap();
    let args = Args {
        masters: vec!["irina".to_string()],
        user: Some("vera".to_string()),
        log_level: Some("debug".to_string()),
        data_file: Some(PathBuf::from("-")),
        no_color: true,
        ..Args::default()
    };
    settings.apply_args(&args);

    assert_eq!(settings.masters, vec!["irina"]);
    assert_eq!(settings.user.as_deref(), Some("vera"));
    assert_eq!(settings.log_level.as_deref(), Some("debug"));
    assert_eq!(settings.data_file, None);
    assert_eq!(settings.color, Some(false));
}

#[tokio::test]
async fn test_resolve_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "user = \"anna\"\nslot-granularity-minutes = 15").unwrap();
    let args = Args {
        config_file: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let settings = Settings::resolve(&args).await.unwrap();
    assert_eq!(settings.user.as_deref(), Some("anna"));
    assert_eq!(settings.scheduler.slot_granularity_minutes, 15);
    assert_eq!(settings.masters, vec![DEFAULT_MASTER]);
}

#[tokio::test]
async fn test_resolve_missing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let args = Args {
        config_file: Some(missing.clone()),
        ..Args::default()
    };

    match Settings::resolve(&args).await {
        Err(ConfigError::NotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "user = ").unwrap();
    let args = Args {
        config_file: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    assert!(matches!(
        Settings::resolve(&args).await,
        Err(ConfigError::Parse { .. })
    ));
}
