//! Built-in tool defaults
//!
//! How each external tool is launched when the host config has no
//! `tools` section. The host section is deep-merged over these values.

use serde::{Deserialize, Serialize};

/// Launch settings for the external tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Bundler command line prefix (default: `npx webpack`)
    pub webpack: Vec<String>,

    /// Style compiler command line prefix (default: `npx sass`)
    pub sass: Vec<String>,

    /// Image optimizer command line prefix (default: `npx imagemin`)
    pub imagemin: Vec<String>,

    /// Directory for generated bundler configs and stats, relative to the
    /// project root (default: ".build")
    pub scratch_dir: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            webpack: vec!["npx".to_string(), "webpack".to_string()],
            sass: vec!["npx".to_string(), "sass".to_string()],
            imagemin: vec!["npx".to_string(), "imagemin".to_string()],
            scratch_dir: ".build".to_string(),
        }
    }
}

impl ToolSettings {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "webpack": self.webpack,
            "sass": self.sass,
            "imagemin": self.imagemin,
            "scratch_dir": self.scratch_dir,
        })
    }
}
