//! # CyberBot Core
//!
//! Shared building blocks for every CyberBot crate: configuration,
//! the unified error type, data model and the service traits the
//! message router is wired from.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{CyberBotError, Result};
