//! Common test utilities for extman-extensions
//!
//! This module provides shared test infrastructure including:
//! - Constants and record builders
//! - Fixture home directories with installed packages
//! - Mock stores and registrars that record their invocations

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod fixtures;
pub mod mocks;

pub use constants::*;
pub use fixtures::*;
pub use mocks::*;
