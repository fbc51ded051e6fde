//! Configuration loading for Agora services.
//!
//! Configuration lives in `~/.agora/` and may be split across several JSON
//! files that are deep-merged in order, later files overriding earlier ones.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (AGORA_* prefix, applied by the owning crate)
//! 2. Later files in the load order
//! 3. Earlier files in the load order
//! 4. Default values
//!
//! # Environment Variable Mapping
//!
//! - `AGORA_CONFIG_DIR` → configuration directory
//! - `AGORA_LOG_LEVEL` → observability.log_level
//! - `AGORA_LOG_FORMAT` → observability.log_format

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, ResultExt};
use crate::validation::{Validate, ValidationError, ValidationResult};

/// Get the configuration directory path.
///
/// `AGORA_CONFIG_DIR` wins over the home-directory default.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AGORA_CONFIG_DIR") {
        return PathBuf::from(expand_path(&dir));
    }
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".agora"),
        |dirs| dirs.home_dir().join(".agora"),
    )
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration shared by every Agora binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of {}", LEVELS.join(", ")),
            });
        }
        if self.log_format != "json" && self.log_format != "pretty" {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: "must be \"json\" or \"pretty\"".into(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Modular Loading
// ============================================================================

/// Load a JSON file and return its contents as a Value.
/// Returns None if file doesn't exist.
pub fn load_json_file(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;

    let value: Value =
        serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))?;

    Ok(Some(value))
}

/// Deep merge two JSON values.
/// Source values override target values, with object merging at each level.
/// Arrays are replaced wholesale.
pub fn merge_json(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(&key) {
                    Some(target_value) => merge_json(target_value, source_value),
                    None => {
                        target_map.insert(key, source_value);
                    }
                }
            }
        }
        (target, source) => {
            *target = source;
        }
    }
}

/// Load and deep-merge the named files from a configuration directory.
///
/// Missing files are skipped; a file that exists but is not a JSON object
/// is rejected.
pub fn load_modular_config(dir: Option<PathBuf>, files: &[&str]) -> Result<Value> {
    let cfg_dir = dir.unwrap_or_else(config_dir);
    tracing::debug!("Loading modular config from {}", cfg_dir.display());

    let mut config = Value::Object(Default::default());
    for name in files {
        let path = cfg_dir.join(name);
        if let Some(value) = load_json_file(&path)? {
            if !value.is_object() {
                return Err(Error::Config(format!(
                    "{} must contain a JSON object",
                    path.display()
                )));
            }
            tracing::debug!(file = %name, "Merging config file");
            merge_json(&mut config, value);
        }
    }

    Ok(config)
}
