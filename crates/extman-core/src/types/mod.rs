//! Type definitions for extension records, problems and the manifest file

mod extension_types;
mod manifest_types;
mod problem_types;

pub use extension_types::*;
pub use manifest_types::*;
pub use problem_types::*;
