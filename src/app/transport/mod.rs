//! Console chat transport
//!
//! Stands in for a messenger bot: each input line is a message from the
//! current user, and replies and booking notifications are written back as
//! text.

pub mod console;
pub mod parser;
pub mod render;

pub use console::{Console, Outcome};
