//! # extman-core
//!
//! Core library for extman providing:
//! - Extension record types (raw and validated) and validation problems
//! - JSON Schema registration for extension-provided configuration schemas
//! - Host configuration (framework home, manifest location, reload switch)

pub mod config;
pub mod error;
pub mod schema;
pub mod types;
pub mod utils;

pub use config::HostConfig;
pub use error::{Error, Result};
pub use schema::{JsonSchemaRegistry, SchemaRegistrar};
pub use utils::get_home_dir;
