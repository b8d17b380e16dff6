//! Tests for command line argument parsing

use crate::app::cli::args::*;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_no_arguments() {
    let args = Args::try_parse_from(["salonbook"]).unwrap();
    assert_eq!(args, Args::default());
    assert_eq!(args.color_override(), None);
    assert!(args.master_ids().is_empty());
}

#[test]
fn test_all_options() {
    let args = Args::try_parse_from([
        "salonbook",
        "--config-file",
        "/tmp/salon.toml",
        "--data-file",
        "/tmp/salon.json",
        "--user",
        "anna",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--log-file",
        "/tmp/salon.log",
        "--no-color",
    ])
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("/tmp/salon.toml")));
    assert_eq!(args.data_file, Some(PathBuf::from("/tmp/salon.json")));
    assert_eq!(args.user.as_deref(), Some("anna"));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/salon.log")));
    assert_eq!(args.color_override(), Some(false));
}

#[test]
fn test_masters_repeated_and_comma_separated() {
    let args = Args::try_parse_from(["salonbook", "-m", "olga, irina", "--master", "olga", "-m", "vera"])
        .unwrap();
    assert_eq!(args.master_ids(), vec!["olga", "irina", "vera"]);
}

#[test]
fn test_split_ids_drops_blanks() {
    let values = vec![" ,a,, b ".to_string(), "".to_string()];
    assert_eq!(split_ids(&values), vec!["a", "b"]);
}

#[test]
fn test_color_flags_conflict() {
    assert!(Args::try_parse_from(["salonbook", "--color", "--no-color"]).is_err());
    let args = Args::try_parse_from(["salonbook", "-g"]).unwrap();
    assert_eq!(args.color_override(), Some(true));
}

#[test]
fn test_rejects_unknown_log_values() {
    assert!(Args::try_parse_from(["salonbook", "--log-level", "loud"]).is_err());
    assert!(Args::try_parse_from(["salonbook", "--log-format", "xml"]).is_err());
}
