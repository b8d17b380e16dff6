//! Tests for command line parsing and configuration resolution

pub mod args_tests;
pub mod config_tests;
