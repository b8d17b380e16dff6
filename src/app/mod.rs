//! Application module: configuration, console transport and background tasks

pub mod cli;
pub mod persistence;
pub mod startup;
pub mod sweeper;
pub mod transport;
