//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - A router wired to in-memory stores (`TestApp`)
//! - Publisher and store doubles
//! - Session token helpers
//! - Custom assertion macros

pub mod doubles;

// Re-export commonly used utilities
pub use auth_helpers::*;
pub use doubles::*;
pub use test_app::*;
