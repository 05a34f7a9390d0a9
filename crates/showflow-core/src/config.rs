//! Configuration management for showflow.
//!
//! Loads configuration from ${SHOWFLOW_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::flow::FlowTimings;

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Recursively merges items from source table into target table.
///
/// Scalars in `source` overwrite `target`; comments in `target` survive.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for showflow configuration.
    //!
    //! SHOWFLOW_HOME resolution order:
    //! 1. SHOWFLOW_HOME environment variable (if set)
    //! 2. ~/.config/showflow (default)
    //! 3. ./.showflow when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the showflow home directory.
    pub fn showflow_home() -> PathBuf {
        if let Ok(home) = std::env::var("SHOWFLOW_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".showflow"),
            |h| h.join(".config").join("showflow"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        showflow_home().join("config.toml")
    }
}

/// Delays of the presentation sequence, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingsConfig {
    pub splash_secs: f64,
    pub sheet_delay_secs: f64,
    pub popup_delay_secs: f64,
    pub promo_delay_secs: f64,
    /// Renderer hint only; the sequencers never wait on it.
    pub crossfade_secs: f64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            splash_secs: 2.0,
            sheet_delay_secs: 1.6,
            popup_delay_secs: 1.6,
            promo_delay_secs: 1.6,
            crossfade_secs: 0.25,
        }
    }
}

impl TimingsConfig {
    pub fn splash(&self) -> Duration {
        secs_to_duration(self.splash_secs)
    }

    pub fn crossfade(&self) -> Duration {
        secs_to_duration(self.crossfade_secs)
    }

    pub fn flow(&self) -> FlowTimings {
        FlowTimings {
            sheet: secs_to_duration(self.sheet_delay_secs),
            popup: secs_to_duration(self.popup_delay_secs),
            promo: secs_to_duration(self.promo_delay_secs),
        }
    }

    /// Rejects non-finite or negative values. Crossfade may be zero; delays
    /// must be at least one millisecond once rounded.
    pub fn validate(&self) -> Result<()> {
        let delays = [
            ("splash_secs", self.splash_secs),
            ("sheet_delay_secs", self.sheet_delay_secs),
            ("popup_delay_secs", self.popup_delay_secs),
            ("promo_delay_secs", self.promo_delay_secs),
        ];
        for (name, value) in delays {
            if !value.is_finite() || secs_to_duration(value).is_zero() {
                anyhow::bail!(
                    "timings.{name} must be at least 0.001 seconds, got {value}"
                );
            }
        }
        if !self.crossfade_secs.is_finite() || self.crossfade_secs < 0.0 {
            anyhow::bail!(
                "timings.crossfade_secs must be zero or more seconds, got {}",
                self.crossfade_secs
            );
        }
        Ok(())
    }
}

/// Converts seconds to a millisecond-rounded duration so that delays written
/// as decimals (1.6) line up exactly with clocks advanced in milliseconds.
pub fn secs_to_duration(secs: f64) -> Duration {
    Duration::from_millis((secs.max(0.0) * 1000.0).round() as u64)
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// tracing filter directive (e.g. "info", "showflow_core=debug").
    pub level: String,
    /// Optional file that receives a copy of every log line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timings: TimingsConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };

        config
            .timings
            .validate()
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(config)
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with the values above. The embedded template provides the
    /// structure and comments; generated values are merged into it.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}
