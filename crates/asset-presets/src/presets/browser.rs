//! Presets for plain browser builds

use serde_json::{json, Value};

use super::{css_extract_plugin, css_rule, scss_rule, source_map_rule, terser_plugin};
use crate::descriptor::plugin;
use crate::registry::{ConfigFragments, Preset};

/// Apps distributed to the end user: JS, CSS and Sass
pub(crate) fn app() -> Preset {
    Preset {
        name: "app",
        description: "Browser application with JS, CSS and Sass support",
        webpack: ConfigFragments {
            common: Some(json!({
                "context": "src/",
                "output": { "path": "dist/" },
                "resolve": { "mainFields": ["moduleExternal", "module", "main"] },
                "module": {
                    "rules": [source_map_rule(), css_rule(), scss_rule(&[])]
                }
            })),
            production: Some(json!({
                "mode": "production",
                "optimization": {
                    "minimizer": [terser_plugin(), plugin("css-minimizer-webpack-plugin", Value::Null)]
                },
                "plugins": [css_extract_plugin("style/style.min.css")]
            })),
            development: Some(json!({
                "mode": "development",
                "devtool": "source-map",
                "plugins": [css_extract_plugin("style/style.css")]
            })),
        },
    }
}

/// JS-only libraries in UMD format
pub(crate) fn library() -> Preset {
    Preset {
        name: "lib",
        description: "UMD library, JS only",
        webpack: ConfigFragments {
            common: Some(json!({
                "context": "src/",
                "output": { "path": "dist/", "libraryTarget": "umd" },
                "resolve": { "mainFields": ["moduleExternal", "module", "main"] },
                "module": { "rules": [source_map_rule()] }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_extracts_css_per_variant() {
        let preset = app();
        let prod = preset.webpack.production.unwrap();
        let dev = preset.webpack.development.unwrap();
        assert_eq!(prod["plugins"][0]["options"]["filename"], "style/style.min.css");
        assert_eq!(dev["plugins"][0]["options"]["filename"], "style/style.css");
    }

    #[test]
    fn test_library_is_umd() {
        let common = library().webpack.common.unwrap();
        assert_eq!(common["output"]["libraryTarget"], "umd");
    }
}
