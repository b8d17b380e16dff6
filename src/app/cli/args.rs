//! Command line arguments
//!
//! Every option can also be set in the TOML configuration file; values given
//! on the command line win.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "salonbook")]
#[command(about = "Appointment booking for a single-master salon")]
#[command(version)]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// JSON file the salon state is kept in
    #[arg(short = 'd', long = "data-file", value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// User the console acts as
    #[arg(short = 'u', long = "user", value_name = "ID")]
    pub user: Option<String>,

    /// Users holding the master role*
    #[arg(short = 'm', long = "master", value_name = "IDS", action = ArgAction::Append)]
    pub masters: Vec<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Force coloured output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// `Some` when colour was forced either way, `None` to follow the terminal
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Master ids from repeated and comma-separated `--master` values
    pub fn master_ids(&self) -> Vec<String> {
        split_ids(&self.masters)
    }
}

/// Split comma-separated ids, trimming blanks and dropping duplicates
pub fn split_ids(values: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in values.iter().flat_map(|v| v.split(',')) {
        let id = id.trim();
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
