//! Descriptors for values that JSON cannot carry
//!
//! The bundler loader walks the merged configuration and revives every
//! object that carries one of the marker keys below:
//!
//! - `{"$regex": "\\.js$"}` becomes a `RegExp`
//! - `{"$plugin": "terser-webpack-plugin", "options": {..}}` becomes
//!   `new (require("terser-webpack-plugin"))(options)`
//! - `{"$require": "sass"}` becomes the module itself
//!
//! `$export` selects a named export instead of the default one.

use serde_json::{Map, Value};

/// Marker key for regular expressions
pub const REGEX_KEY: &str = "$regex";

/// Marker key for plugin constructors
pub const PLUGIN_KEY: &str = "$plugin";

/// Marker key for plain module references
pub const REQUIRE_KEY: &str = "$require";

/// Named export selector for `$plugin` and `$require`
pub const EXPORT_KEY: &str = "$export";

/// Constructor argument of a `$plugin` descriptor
pub const OPTIONS_KEY: &str = "options";

/// A regular expression descriptor
pub fn regex(pattern: &str) -> Value {
    let mut map = Map::new();
    map.insert(REGEX_KEY.to_string(), Value::String(pattern.to_string()));
    Value::Object(map)
}

/// A plugin built from the module's default export.
///
/// `Value::Null` options means the constructor is called without arguments.
pub fn plugin(module: &str, options: Value) -> Value {
    plugin_descriptor(module, None, options)
}

/// A plugin built from a named export of the module
pub fn plugin_export(module: &str, export: &str, options: Value) -> Value {
    plugin_descriptor(module, Some(export), options)
}

/// A reference to a module's default export
pub fn module_ref(module: &str) -> Value {
    let mut map = Map::new();
    map.insert(REQUIRE_KEY.to_string(), Value::String(module.to_string()));
    Value::Object(map)
}

/// A reference to a named export of a module
pub fn module_export(module: &str, export: &str) -> Value {
    let mut map = Map::new();
    map.insert(REQUIRE_KEY.to_string(), Value::String(module.to_string()));
    map.insert(EXPORT_KEY.to_string(), Value::String(export.to_string()));
    Value::Object(map)
}

/// Whether a value is a `$plugin` descriptor
pub fn is_plugin(value: &Value) -> bool {
    value.get(PLUGIN_KEY).map_or(false, Value::is_string)
}

/// Whether a value stands for something other than a plain object.
///
/// Descriptors are opaque to merging: a later value replaces them whole.
pub fn is_descriptor(value: &Value) -> bool {
    [REGEX_KEY, PLUGIN_KEY, REQUIRE_KEY]
        .iter()
        .any(|key| value.get(*key).map_or(false, Value::is_string))
}

fn plugin_descriptor(module: &str, export: Option<&str>, options: Value) -> Value {
    let mut map = Map::new();
    map.insert(PLUGIN_KEY.to_string(), Value::String(module.to_string()));
    if let Some(export) = export {
        map.insert(EXPORT_KEY.to_string(), Value::String(export.to_string()));
    }
    if !options.is_null() {
        map.insert(OPTIONS_KEY.to_string(), options);
    }
    Value::Object(map)
}
