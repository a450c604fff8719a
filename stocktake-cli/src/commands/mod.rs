//! CLI command implementations

pub mod console;
