//! Preset registry

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::presets;

/// Names of the built-in presets, in registry order
pub const PRESET_NAMES: &[&str] = &[
    "app",
    "lib",
    "vue",
    "vue-postcss",
    "pwa-vue",
    "node-app",
    "node-lib",
];

/// Partial webpack configuration split by build variant.
///
/// Used both for preset data and for the `webpack` section of a host
/// project's configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFragments {
    /// Shared between production and development builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common: Option<Value>,

    /// Production-only settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<Value>,

    /// Development-only settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<Value>,
}

/// A named set of default bundler fragments
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Registry key (e.g. "vue")
    pub name: &'static str,

    /// One-line description shown in help output
    pub description: &'static str,

    /// Webpack fragments
    pub webpack: ConfigFragments,
}

/// Preset lookup errors
#[derive(Debug, Error, PartialEq)]
pub enum PresetError {
    #[error("unknown preset \"{name}\"; valid presets: {valid}")]
    Unknown { name: String, valid: String },
}

/// Immutable table of presets.
///
/// Built once and handed to the orchestrator; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: Vec<Preset>,
}

impl PresetRegistry {
    /// The built-in presets
    pub fn standard() -> Self {
        Self {
            presets: vec![
                presets::app(),
                presets::library(),
                presets::vue(),
                presets::vue_postcss(),
                presets::pwa_vue(),
                presets::node_app(),
                presets::node_lib(),
            ],
        }
    }

    /// Build a registry from an explicit list (mostly for tests)
    pub fn from_presets(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    /// Look up a preset by name
    pub fn get(&self, name: &str) -> Result<&Preset, PresetError> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PresetError::Unknown {
                name: name.to_string(),
                valid: self
                    .names()
                    .iter()
                    .map(|n| format!("\"{}\"", n))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Registered names in order
    pub fn names(&self) -> Vec<&'static str> {
        self.presets.iter().map(|p| p.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }
}
