//! CLI command implementations.

pub mod analyze;
pub mod apply;
pub mod common;
pub mod config;
pub mod presets;
pub mod record;
