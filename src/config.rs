use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{GeoFixError, Result};

/// Environment variable naming the config file used by the binary
pub const CONFIG_PATH_ENV: &str = "GEOFIX_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "geofix.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stage: StageConfig,
    pub resolver: ResolverConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Name reported to monitoring for this stage
    pub plugin_name: String,
    /// Capacity of the channel between the record reader and the stage
    pub channel_capacity: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            plugin_name: "geofix".to_string(),
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Message attribute used as lookup key
    pub lookup_field: String,
    /// Place name -> coordinate values (`[latitude, longitude]`)
    pub places: HashMap<String, Vec<f64>>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup_field: "location".to_string(),
            places: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_name: String,
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_name: "geofix.log".to_string(),
            default_directive: "geofix=info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GeoFixError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the file named by `GEOFIX_CONFIG`, falling back to `geofix.toml`
    /// and then to defaults when neither exists.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path),
            Err(std::env::VarError::NotPresent) => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    Self::load(DEFAULT_CONFIG_PATH)
                } else {
                    Ok(Self::default())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stage.plugin_name.trim().is_empty() {
            return Err(GeoFixError::Config("stage.plugin_name must not be empty".to_string()));
        }
        if self.stage.channel_capacity == 0 {
            return Err(GeoFixError::Config("stage.channel_capacity must be greater than zero".to_string()));
        }
        if self.resolver.lookup_field.trim().is_empty() {
            return Err(GeoFixError::Config("resolver.lookup_field must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.stage.plugin_name, "geofix");
        assert_eq!(config.stage.channel_capacity, 256);
        assert_eq!(config.resolver.lookup_field, "location");
        assert!(config.resolver.places.is_empty());
        assert_eq!(config.logging.default_directive, "geofix=info");
    }

    #[test]
    fn test_parses_places_table() {
        let config = Config::from_toml_str(
            r#"
            [stage]
            plugin_name = "geofix-it"

            [resolver]
            lookup_field = "city"

            [resolver.places]
            "Rome" = [41.9028, 12.4964]
            "Bari" = [41.1171, 16.8719]
            "Nowhere" = [1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.stage.plugin_name, "geofix-it");
        assert_eq!(config.stage.channel_capacity, 256);
        assert_eq!(config.resolver.lookup_field, "city");
        assert_eq!(config.resolver.places["Rome"], vec![41.9028, 12.4964]);
        assert_eq!(config.resolver.places["Nowhere"], vec![1.0]);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = Config::from_toml_str("[stage]\nchannel_capacity = 0\n");
        assert!(matches!(result, Err(GeoFixError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = Config::from_toml_str("[stage\nplugin_name = ");
        assert!(matches!(result, Err(GeoFixError::Toml(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\ndirectory = \"/tmp/geofix-logs\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.directory, "/tmp/geofix-logs");
        assert_eq!(config.logging.file_name, "geofix.log");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = Config::load("/definitely/not/here/geofix.toml");
        assert!(matches!(result, Err(GeoFixError::Config(_))));
    }
}
