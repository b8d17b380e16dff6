//! Core services and infrastructure

pub mod error_handling;
pub mod logging;
pub mod shutdown;
pub mod strings;
pub mod styles; // console palette shared by the transport and clap help
pub mod sync;
pub mod time;
pub mod validation;
pub mod version;
