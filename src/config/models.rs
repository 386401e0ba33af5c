//! Configuration data structures for the filter engine.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files and carry defaults
//! so that a minimal config only lists the filter directories.
use serde::{Deserialize, Serialize};

fn default_suffix() -> String {
    ".filter".to_string()
}

fn default_poll_interval() -> String {
    "5s".to_string()
}

fn default_watch() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

/// Directories scanned for filter files
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DirectoryConfig {
    /// Directories to scan (non-recursive)
    #[serde(default)]
    pub paths: Vec<String>,
    /// Only files ending with this suffix are loaded
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Interval between scans, e.g. "5s" or "1m"
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Rescan as soon as the filesystem reports a change
    #[serde(default = "default_watch")]
    pub watch: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            suffix: default_suffix(),
            poll_interval: default_poll_interval(),
            watch: default_watch(),
        }
    }
}

/// Log output settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            include_spans: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub directories: DirectoryConfig,
    /// Disable property keys to switch on at startup, e.g. `zuul.AuthFilter.pre.disable`
    #[serde(default)]
    pub disabled_filters: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Parsed scan interval.
    pub fn poll_interval(&self) -> Result<std::time::Duration, humantime::DurationError> {
        humantime::parse_duration(&self.directories.poll_interval)
    }
}
