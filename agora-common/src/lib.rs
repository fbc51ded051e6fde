//! Agora Common - Shared types, utilities, and configuration for the Agora services.
//!
//! This crate provides:
//! - Layered JSON configuration loading
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup
//! - Utility functions used across Agora crates (rounding, truncation, digests)

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{config_dir, load_modular_config, ObservabilityConfig};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};

