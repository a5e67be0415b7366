//! Host project configuration
//!
//! The host project describes what to build in one file, JSON or TOML,
//! with an optional section per module plus `custom` plugin injections
//! and `tools` launch overrides. Loading records where the file came
//! from and a digest of its bytes.

use std::fs;
use std::path::Path;

use asset_presets::ConfigFragments;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::defaults::ToolSettings;
use super::merge::deep_merge;
use crate::tasks::imagemin::ImageminConfig;
use crate::tasks::sass::{SassConfig, SASS_STYLES};

/// A plugin the host project wants appended to every bundler config
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomPlugin {
    /// Module to `require`
    pub module: String,

    /// Named export holding the constructor (default export if absent)
    #[serde(default)]
    pub export: Option<String>,

    /// Extra constructor options; build metadata is added under `build`
    #[serde(default)]
    pub options: Option<Value>,
}

/// The `custom` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomConfig {
    #[serde(default)]
    pub plugins: Vec<CustomPlugin>,
}

/// Parsed host configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostConfig {
    pub imagemin: Option<ImageminConfig>,
    pub sass: Option<SassConfig>,
    pub webpack: Option<ConfigFragments>,
    pub custom: Option<CustomConfig>,

    /// Overrides for [`ToolSettings`]
    pub tools: Option<Value>,
}

/// Where a loaded host config came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub path: String,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// A host config together with its provenance
#[derive(Debug, Clone)]
pub struct LoadedHostConfig {
    pub config: HostConfig,
    pub source: ConfigSource,
}

impl HostConfig {
    /// Load the host config file. The format follows the file extension.
    pub fn load(path: &Path) -> Result<LoadedHostConfig, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("cannot resolve {}: {}", path.display(), e)))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let value = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?,
            Some("toml") => {
                let toml_value: toml::Value = toml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
                toml_to_json(toml_value)
            }
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };

        let config = Self::from_value(value)?;
        Ok(LoadedHostConfig {
            config,
            source: ConfigSource {
                path: path.to_string_lossy().to_string(),
                digest,
            },
        })
    }

    /// Build from an already parsed value
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: HostConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Tool launch settings with the `tools` section merged over the defaults
    pub fn tool_settings(&self) -> Result<ToolSettings, ConfigError> {
        let defaults = ToolSettings::default();
        let Some(overrides) = &self.tools else {
            return Ok(defaults);
        };
        let merged = deep_merge(defaults.to_value(), overrides.clone());
        let settings: ToolSettings = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ValidationError(format!("tools: {}", e)))?;
        for (name, command) in [
            ("webpack", &settings.webpack),
            ("sass", &settings.sass),
            ("imagemin", &settings.imagemin),
        ] {
            if command.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "tools.{} must name a program",
                    name
                )));
            }
        }
        Ok(settings)
    }

    /// Plugins from the `custom` section
    pub fn custom_plugins(&self) -> &[CustomPlugin] {
        self.custom.as_ref().map(|c| c.plugins.as_slice()).unwrap_or(&[])
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(webpack) = &self.webpack {
            for (name, fragment) in [
                ("common", &webpack.common),
                ("production", &webpack.production),
                ("development", &webpack.development),
            ] {
                if let Some(value) = fragment {
                    if !value.is_object() {
                        return Err(ConfigError::ValidationError(format!(
                            "webpack.{} must be an object",
                            name
                        )));
                    }
                }
            }
        }

        if let Some(sass) = &self.sass {
            for (i, task) in sass.tasks.iter().enumerate() {
                if let Some(style) = &task.style {
                    if !SASS_STYLES.contains(&style.as_str()) {
                        return Err(ConfigError::ValidationError(format!(
                            "sass.tasks[{}].style must be one of: {}",
                            i,
                            SASS_STYLES.join(", ")
                        )));
                    }
                }
            }
        }

        for (i, plugin) in self.custom_plugins().iter().enumerate() {
            if plugin.module.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "custom.plugins[{}].module must not be empty",
                    i
                )));
            }
        }

        Ok(())
    }
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("unsupported host config format \"{0}\"; expected .json or .toml")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_empty_config_has_no_modules() {
        let config = HostConfig::from_value(json!({})).unwrap();
        assert!(config.imagemin.is_none());
        assert!(config.sass.is_none());
        assert!(config.webpack.is_none());
        assert!(config.custom_plugins().is_empty());
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let config = HostConfig::from_value(json!({"eslint": {"fix": true}})).unwrap();
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn test_load_json_file() {
        let mut temp = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            temp,
            r#"{{"webpack": {{"common": {{"entry": {{"app": "./index.js"}}}}}}, "sass": {{"tasks": [{{"source": "a.scss"}}]}}}}"#
        )
        .unwrap();

        let loaded = HostConfig::load(temp.path()).unwrap();
        let webpack = loaded.config.webpack.unwrap();
        assert_eq!(webpack.common.unwrap()["entry"]["app"], "./index.js");
        assert_eq!(loaded.config.sass.unwrap().tasks.len(), 1);
        assert_eq!(loaded.source.digest.len(), 64);
    }

    #[test]
    fn test_load_toml_file() {
        let mut temp = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(temp, "[webpack.production]").unwrap();
        writeln!(temp, "devtool = false").unwrap();
        writeln!(temp, "[[custom.plugins]]").unwrap();
        writeln!(temp, "module = \"./build/version-plugin.js\"").unwrap();

        let loaded = HostConfig::load(temp.path()).unwrap();
        let webpack = loaded.config.webpack.as_ref().unwrap();
        assert_eq!(webpack.production.as_ref().unwrap()["devtool"], false);
        assert_eq!(loaded.config.custom_plugins()[0].module, "./build/version-plugin.js");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = HostConfig::load(Path::new("/nonexistent/build/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().contains("/nonexistent/build/config.json"));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp = Builder::new().suffix(".mjs").tempfile().unwrap();
        let err = HostConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "mjs"));
    }

    #[test]
    fn test_webpack_fragment_must_be_object() {
        let err = HostConfig::from_value(json!({"webpack": {"common": [1, 2]}})).unwrap_err();
        assert!(err.to_string().contains("webpack.common"));
    }

    #[test]
    fn test_invalid_sass_style() {
        let err = HostConfig::from_value(json!({"sass": {"tasks": [{"style": "fancy"}]}})).unwrap_err();
        assert!(err.to_string().contains("sass.tasks[0].style"));
    }

    #[test]
    fn test_tool_settings_merge_over_defaults() {
        let config = HostConfig::from_value(json!({"tools": {"sass": ["sass"]}})).unwrap();
        let settings = config.tool_settings().unwrap();
        assert_eq!(settings.sass, vec!["sass"]);
        assert_eq!(settings.webpack, vec!["npx", "webpack"]);
    }

    #[test]
    fn test_tool_settings_reject_empty_command() {
        let config = HostConfig::from_value(json!({"tools": {"webpack": []}})).unwrap();
        assert!(config.tool_settings().is_err());
    }
}
