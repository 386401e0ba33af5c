use std::path::Path;

use config::{Config, File, FileFormat};
use eyre::{Context, Result};

use crate::config::{models::EngineConfig, validation::EngineConfigValidator};

/// Load and validate configuration from a file using the config crate
/// Supports multiple formats: YAML, JSON, TOML, etc.
pub fn load_config(config_path: &str) -> Result<EngineConfig> {
    let engine_config = load_config_unchecked(config_path)?;
    EngineConfigValidator::validate(&engine_config)
        .with_context(|| format!("Invalid configuration in {config_path}"))?;
    Ok(engine_config)
}

/// Load configuration without validation
pub fn load_config_unchecked(config_path: &str) -> Result<EngineConfig> {
    let config_path = Path::new(config_path);

    // Determine file format based on extension
    let format = match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("toml") => FileFormat::Toml,
        Some("ini") => FileFormat::Ini,
        _ => FileFormat::Toml,
    };

    let settings = Config::builder()
        .add_source(File::new(
            config_path
                .to_str()
                .ok_or_else(|| eyre::eyre!("Invalid UTF-8 path: {}", config_path.display()))?,
            format,
        ))
        .build()
        .with_context(|| format!("Failed to build config from {}", config_path.display()))?;

    settings.try_deserialize().with_context(|| {
        format!(
            "Failed to deserialize config from {}",
            config_path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_load_toml_config() {
        let toml_content = r#"
disabled_filters = ["zuul.DebugFilter.pre.disable"]

[directories]
paths = ["/etc/zuul/pre", "/etc/zuul/post"]
poll_interval = "10s"

[logging]
level = "debug"
json = true
"#;

        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.directories.paths.len(), 2);
        assert_eq!(config.directories.suffix, ".filter");
        assert_eq!(config.directories.poll_interval, "10s");
        assert_eq!(config.disabled_filters, vec!["zuul.DebugFilter.pre.disable"]);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_yaml_config() {
        let yaml_content = r#"
directories:
  paths:
    - "/etc/zuul/route"
  suffix: ".rs"
  watch: false
"#;

        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.directories.suffix, ".rs");
        assert!(!config.directories.watch);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let json_content = r#"{ "directories": { "paths": ["/tmp"], "poll_interval": "soon" } }"#;

        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{}", json_content).unwrap();

        assert!(load_config(temp_file.path().to_str().unwrap()).is_err());
        assert!(load_config_unchecked(temp_file.path().to_str().unwrap()).is_ok());
    }
}
