//! CLI command implementations

pub mod extension;
