//! Vue.js presets

use serde_json::{json, Value};

use super::{css_extract_plugin, css_rule, scss_rule, source_map_rule, terser_plugin};
use crate::descriptor::{plugin, regex};
use crate::registry::{ConfigFragments, Preset};

fn vue_rules(image_inline_limit: u64, scss_extra: &[Value], html_loader: &str) -> Vec<Value> {
    vec![
        json!({ "test": regex("\\.vue$"), "loader": "vue-loader" }),
        source_map_rule(),
        json!({
            "test": regex("\\.(jpg|png)$"),
            "use": [{ "loader": "url-loader", "options": { "limit": image_inline_limit } }]
        }),
        json!({
            "test": regex("\\.svg$"),
            "loader": "vue-svg-loader",
            "options": {
                "svgo": {
                    "plugins": [
                        { "removeDoctype": true },
                        { "removeComments": true },
                        { "inlineStyles": false }
                    ]
                }
            }
        }),
        css_rule(),
        scss_rule(scss_extra),
        json!({ "test": regex("\\.(htmlf)$"), "use": { "loader": html_loader } }),
    ]
}

fn vue_fragments(scss_extra: &[Value]) -> ConfigFragments {
    ConfigFragments {
        common: Some(json!({
            "context": "src/",
            "output": { "path": "dist/", "libraryTarget": "umd" },
            "resolve": { "mainFields": ["moduleExternal", "module", "main"] },
            "module": { "rules": vue_rules(65000, scss_extra, "vue-template-loader") }
        })),
        production: Some(json!({
            "mode": "production",
            "optimization": {
                "minimizer": [terser_plugin(), plugin("optimize-css-assets-webpack-plugin", json!({}))]
            }
        })),
        development: Some(json!({
            "mode": "development",
            "devtool": "source-map"
        })),
    }
}

/// Libraries built on Vue.js
pub(crate) fn vue() -> Preset {
    Preset {
        name: "vue",
        description: "Vue.js library with Sass and SVG support",
        webpack: vue_fragments(&[]),
    }
}

/// Same as `vue`, with PostCSS run over compiled Sass
pub(crate) fn vue_postcss() -> Preset {
    Preset {
        name: "vue-postcss",
        description: "Vue.js library with a PostCSS stage after Sass",
        webpack: vue_fragments(&[json!({
            "loader": "postcss-loader",
            "options": { "sourceMap": true }
        })]),
    }
}

/// Progressive web apps built on Vue.js
pub(crate) fn pwa_vue() -> Preset {
    Preset {
        name: "pwa-vue",
        description: "Vue.js progressive web app, cleans the output directory",
        webpack: ConfigFragments {
            common: Some(json!({
                "context": "src",
                "output": { "path": "dist", "libraryTarget": "umd" },
                "resolve": { "mainFields": ["moduleExternal", "module", "main"] },
                "module": { "rules": vue_rules(25000, &[], "html-loader") },
                "plugins": [plugin("webpack-cleanup-plugin", Value::Null)]
            })),
            production: Some(json!({
                "mode": "production",
                "optimization": {
                    "minimizer": [terser_plugin(), plugin("optimize-css-assets-webpack-plugin", json!({}))]
                },
                "plugins": [css_extract_plugin("style/style.[hash].min.css")]
            })),
            development: Some(json!({
                "mode": "development",
                "devtool": "source-map",
                "plugins": [css_extract_plugin("style/style.[hash].css")]
            })),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vue_postcss_differs_only_in_scss_chain() {
        let plain = vue().webpack.common.unwrap();
        let post = vue_postcss().webpack.common.unwrap();
        let plain_rules = plain["module"]["rules"].as_array().unwrap();
        let post_rules = post["module"]["rules"].as_array().unwrap();
        assert_eq!(plain_rules.len(), post_rules.len());
        assert_ne!(plain_rules[5], post_rules[5]);
        assert_eq!(plain_rules[0], post_rules[0]);
    }

    #[test]
    fn test_pwa_inlines_smaller_images() {
        let common = pwa_vue().webpack.common.unwrap();
        assert_eq!(common["module"]["rules"][2]["use"][0]["options"]["limit"], 25000);
    }
}
