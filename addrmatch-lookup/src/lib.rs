//! Address lookup service
//!
//! HTTP front end over the addrmatch fuzzy matcher. The address corpus is
//! read from CSV once per process and shared by every request.
//!
//! ## Module Structure
//!
//! - `config` - Command line and environment configuration
//! - `error` - Request errors and their HTTP mapping
//! - `handlers` - HTTP endpoint handlers
//! - `server` - Router assembly and graceful serving
//! - `service` - Corpus cache, matcher and counters shared by handlers

pub mod config;
pub mod error;
mod handlers;
pub mod server;
pub mod service;

pub use config::LookupConfig;
pub use error::{LookupError, LookupResult};
pub use server::{build_router, serve};
pub use service::{Alternate, LookupOutcome, LookupService};
