//! Core types and configuration for micbuddy.
//!
//! This crate provides platform-agnostic types that can be used across
//! all micbuddy sub-crates.

mod config;
mod state;

pub use config::{Config, ConfigManager, WindowPosition};
pub use state::Status;

/// Application name
pub const APP_NAME: &str = "micbuddy";

/// Pretty application name for display
pub const APP_NAME_PRETTY: &str = "Mic Buddy";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
