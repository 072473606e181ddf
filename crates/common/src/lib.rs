//! flowpulse Common Utilities
//!
//! Shared infrastructure for all flowpulse crates:
//! - Error taxonomy and result alias
//! - Pipeline configuration (flow, motion history, blob location)
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
