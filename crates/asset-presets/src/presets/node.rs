//! Presets for code that runs under node.js

use serde_json::json;

use super::{source_map_rule, terser_plugin};
use crate::registry::{ConfigFragments, Preset};

/// Command-line applications. Single development-style build.
pub(crate) fn node_app() -> Preset {
    Preset {
        name: "node-app",
        description: "node.js command-line application",
        webpack: ConfigFragments {
            common: Some(json!({
                "target": "node",
                "output": { "path": "dist" },
                "externals": [],
                "mode": "development",
                "node": { "__dirname": false },
                "resolve": { "modules": ["node_modules"] }
            })),
            production: None,
            development: None,
        },
    }
}

/// Libraries consumed by node.js command-line applications
pub(crate) fn node_lib() -> Preset {
    Preset {
        name: "node-lib",
        description: "UMD library for node.js",
        webpack: ConfigFragments {
            common: Some(json!({
                "context": "src/",
                "output": {
                    "path": "dist/",
                    "libraryTarget": "umd",
                    "filename": "[name].node.js"
                },
                "resolve": { "mainFields": ["moduleExternal", "module", "main"] },
                "module": { "rules": [source_map_rule()] },
                "target": "node"
            })),
            production: Some(json!({
                "mode": "production",
                "optimization": { "minimizer": [terser_plugin()] }
            })),
            development: Some(json!({
                "mode": "development",
                "devtool": "source-map"
            })),
        },
    }
}
