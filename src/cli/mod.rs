//! Command-line interface for tabledit.

mod commands;
pub mod helpers;
pub mod notice;

pub use commands::{is_verbose, run};
