use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::paths;
use crate::readnoise::{self, ReadNoiseEntry};

/// Root configuration structure for shoc.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShocConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via shoc.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Ask for every keyword that no source can supply.
    #[serde(default)]
    pub strict: bool,

    /// Append a timestamped HISTORY card when a header is updated.
    #[serde(default = "default_history")]
    pub history: bool,

    #[serde(default = "readnoise::builtin_table")]
    pub readnoise_table: Vec<ReadNoiseEntry>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            strict: false,
            history: default_history(),
            readnoise_table: readnoise::builtin_table(),
        }
    }
}

fn default_history() -> bool {
    true
}

impl Defaults {
    /// Reject readout-noise rows with non-positive or non-finite values.
    pub fn validate(&self) -> crate::Result<()> {
        for (i, row) in self.readnoise_table.iter().enumerate() {
            let values = [
                ("ron", row.ron),
                ("sensitivity", row.sensitivity),
                ("saturation", row.saturation),
            ];
            for (name, value) in values {
                if !value.is_finite() || value <= 0.0 {
                    return Err(crate::Error::config_invalid_value(
                        format!("defaults.readnoise_table[{}].{}", i, name),
                        Some(value.to_string()),
                        "must be a positive number",
                    ));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If shoc.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full shoc.json config, falling back to defaults on any error.
pub fn load_config() -> ShocConfig {
    paths::shoc_json()
        .and_then(|path| load_config_from_file(&path))
        .unwrap_or_default()
}

/// Attempt to load config from a shoc.json file.
pub fn load_config_from_file(path: &Path) -> crate::Result<ShocConfig> {
    if !path.exists() {
        return Err(crate::Error::other(format!(
            "{} not found",
            path.display()
        )));
    }

    let content = crate::io::read_file(path, "read config")?;

    let config: ShocConfig = serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))?;
    config.defaults.validate()?;

    Ok(config)
}

/// Save config to shoc.json (creates if missing).
pub fn save_config(config: &ShocConfig) -> crate::Result<()> {
    save_config_to_file(&paths::shoc_json()?, config)
}

pub fn save_config_to_file(path: &Path, config: &ShocConfig) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        crate::Error::validation_invalid_json(e, Some("serialize shoc.json".to_string()))
    })?;

    crate::io::write_file_atomic(path, &content, "write config")
}

/// Check if shoc.json exists
pub fn config_exists() -> bool {
    paths::shoc_json().map(|p| p.exists()).unwrap_or(false)
}

/// Delete shoc.json (reset to defaults)
pub fn reset_config() -> crate::Result<bool> {
    reset_config_file(&paths::shoc_json()?)
}

pub fn reset_config_file(path: &Path) -> crate::Result<bool> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Get the path to shoc.json (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::shoc_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
