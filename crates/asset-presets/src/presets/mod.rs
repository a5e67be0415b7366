//! Preset data

mod browser;
mod node;
mod vue;

use serde_json::{json, Value};

use crate::descriptor::{module_export, plugin};

pub(crate) use browser::{app, library};
pub(crate) use node::{node_app, node_lib};
pub(crate) use vue::{pwa_vue, vue, vue_postcss};

/// Terser settings shared by every minifying preset.
///
/// `keep_classnames` and `keep_fnames` stay on: minified class names must
/// remain comparable with strings, and bundling minified files breaks with
/// "Super expression must either be null or a function" otherwise.
pub(crate) fn terser_options() -> Value {
    json!({
        "terserOptions": {
            "ecma": 2017,
            "parse": {},
            "compress": {},
            "mangle": true,
            "module": false,
            "output": null,
            "toplevel": false,
            "nameCache": null,
            "ie8": false,
            "keep_classnames": true,
            "keep_fnames": true,
            "safari10": false
        }
    })
}

pub(crate) fn terser_plugin() -> Value {
    plugin("terser-webpack-plugin", terser_options())
}

/// `test: /\.js$/` source-map pre-loader rule present in every browser preset
pub(crate) fn source_map_rule() -> Value {
    json!({
        "test": crate::descriptor::regex("\\.js$"),
        "use": ["source-map-loader"],
        "enforce": "pre"
    })
}

pub(crate) fn css_rule() -> Value {
    json!({
        "test": crate::descriptor::regex("\\.css$"),
        "use": [css_extract_loader(), "css-loader"]
    })
}

/// Sass rule; `extra` loaders are inserted between css-loader and sass-loader
pub(crate) fn scss_rule(extra: &[Value]) -> Value {
    let mut chain = vec![
        css_extract_loader(),
        json!({"loader": "css-loader", "options": {"sourceMap": true}}),
    ];
    chain.extend(extra.iter().cloned());
    chain.push(json!({
        "loader": "sass-loader",
        "options": {
            "implementation": crate::descriptor::module_ref("sass"),
            "sourceMap": true
        }
    }));
    json!({
        "test": crate::descriptor::regex("\\.scss$"),
        "use": chain
    })
}

pub(crate) fn css_extract_loader() -> Value {
    module_export("mini-css-extract-plugin", "loader")
}

pub(crate) fn css_extract_plugin(filename: &str) -> Value {
    plugin("mini-css-extract-plugin", json!({ "filename": filename }))
}
