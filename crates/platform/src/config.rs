//! Application configuration and constants
//!
//! This module defines central configuration values used across the application.
//! All branding, naming, and configuration should reference these constants
//! rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "Home Buzzer";

/// Name the device uses for itself on the air (GAP device name)
pub const GAP_NAME: &str = "buzzer-dev1";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

