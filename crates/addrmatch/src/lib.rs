//! # addrmatch Shared Rust Library
//!
//! Shared infrastructure for addrmatch binaries:
//! - **error**: Process-level error type
//! - **tracing**: Level-filtered logging setup and segment prefixes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use addrmatch::error::{Error, Result};
//!
//! addrmatch::tracing::init("debug");
//! ```

pub mod error;
pub mod tracing;

pub use error::{Error, Result};
