//! Command line arguments and configuration file handling

pub mod args;
pub mod config;
pub mod error;

pub use args::Args;
pub use config::{Settings, ServiceSeed};
pub use error::{ConfigError, ConfigResult};

#[cfg(test)]
mod tests;
