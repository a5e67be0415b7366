//! Configuration merge logic
//!
//! Two flavours:
//! - [`deep_merge`] layers settings files: objects merge by key, arrays
//!   and scalars are replaced by the later value.
//! - [`StrategyMerge`] composes bundler configs: objects merge by key,
//!   arrays concatenate, scalars are replaced, and a table of dotted key
//!   paths overrides the default with an explicit strategy. Descriptor
//!   objects (`$plugin`, `$require`, `$regex`) are never merged into.

use std::collections::BTreeMap;

use asset_presets::is_descriptor;
use serde_json::Value;

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (second wins entirely)
/// - Scalars: override (second wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        // Arrays: REPLACE (no concatenation)
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Per-key merge rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Later value wins wholesale, no recursion
    Replace,
    /// Arrays concatenate in source order
    Append,
}

/// Dotted key path → strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyTable {
    entries: BTreeMap<String, MergeStrategy>,
}

impl StrategyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table used for every bundler config
    pub fn webpack() -> Self {
        Self::new()
            .with("externals", MergeStrategy::Replace)
            .with("resolve.mainFields", MergeStrategy::Append)
            .with("resolve.alias", MergeStrategy::Replace)
    }

    pub fn with(mut self, path: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.entries.insert(path.into(), strategy);
        self
    }

    pub fn get(&self, path: &str) -> Option<MergeStrategy> {
        self.entries.get(path).copied()
    }
}

/// Strategy-aware merger for bundler configuration sources
#[derive(Debug, Clone)]
pub struct StrategyMerge {
    table: StrategyTable,
}

impl StrategyMerge {
    pub fn new(table: StrategyTable) -> Self {
        Self { table }
    }

    /// Merge `overlay` onto `base`
    pub fn merge(&self, base: Value, overlay: Value) -> Value {
        self.merge_at("", base, overlay)
    }

    /// Merge sources in order; missing sources are skipped
    pub fn merge_all<I>(&self, sources: I) -> Value
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        sources
            .into_iter()
            .flatten()
            .fold(Value::Null, |acc, source| self.merge(acc, source))
    }

    fn merge_at(&self, path: &str, base: Value, overlay: Value) -> Value {
        if let Some(strategy) = self.table.get(path) {
            return match (strategy, base, overlay) {
                (MergeStrategy::Append, Value::Array(mut items), Value::Array(more)) => {
                    items.extend(more);
                    Value::Array(items)
                }
                (_, _, overlay) => overlay,
            };
        }

        if is_descriptor(&base) || is_descriptor(&overlay) {
            return overlay;
        }

        match (base, overlay) {
            (Value::Object(mut base_map), Value::Object(overlay_map)) => {
                for (key, overlay_value) in overlay_map {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    let merged = match base_map.remove(&key) {
                        Some(base_value) => self.merge_at(&child, base_value, overlay_value),
                        None => overlay_value,
                    };
                    base_map.insert(key, merged);
                }
                Value::Object(base_map)
            }
            (Value::Array(mut items), Value::Array(more)) => {
                items.extend(more);
                Value::Array(items)
            }
            (_, overlay) => overlay,
        }
    }
}

impl Default for StrategyMerge {
    fn default() -> Self {
        Self::new(StrategyTable::webpack())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"publicPath": "/a/"});
        let overlay = json!({"publicPath": "/b/"});
        let result = deep_merge(base, overlay);
        assert_eq!(result["publicPath"], "/b/");
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "webpack": ["npx", "webpack"],
            "scratch_dir": ".build"
        });
        let overlay = json!({
            "scratch_dir": "tmp"
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["scratch_dir"], "tmp");
        assert_eq!(result["webpack"][1], "webpack");
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"sass": ["npx", "sass"]});
        let overlay = json!({"sass": ["sass"]});
        let result = deep_merge(base, overlay);

        let sass = result["sass"].as_array().unwrap();
        assert_eq!(sass.len(), 1);
        assert_eq!(sass[0], "sass");
    }

    #[test]
    fn test_null_override() {
        let base = json!({"value": 100});
        let overlay = json!({"value": null});
        let result = deep_merge(base, overlay);

        assert!(result["value"].is_null());
    }

    #[test]
    fn test_descriptor_replaced_whole() {
        let merger = StrategyMerge::default();
        let result = merger.merge(
            json!({"loader": {"$require": "mini-css-extract-plugin", "$export": "loader"}}),
            json!({"loader": {"$require": "style-loader"}}),
        );
        assert_eq!(result["loader"], json!({"$require": "style-loader"}));
    }

    #[test]
    fn test_plugin_options_not_merged_into() {
        let merger = StrategyMerge::default();
        let result = merger.merge(
            json!({"minimizer": {"$plugin": "terser-webpack-plugin", "options": {"parallel": true}}}),
            json!({"minimizer": {"$plugin": "esbuild-loader", "$export": "EsbuildPlugin"}}),
        );
        assert_eq!(
            result["minimizer"],
            json!({"$plugin": "esbuild-loader", "$export": "EsbuildPlugin"})
        );
    }

    #[test]
    fn test_plain_object_over_regex_replaces() {
        let merger = StrategyMerge::default();
        let result = merger.merge(
            json!({"test": {"$regex": "\\.js$"}}),
            json!({"test": {"and": ["a"]}}),
        );
        assert_eq!(result["test"], json!({"and": ["a"]}));
    }

    #[test]
    fn test_strategy_default_concatenates_arrays() {
        let merger = StrategyMerge::default();
        let result = merger.merge(
            json!({"plugins": [{"$plugin": "a"}]}),
            json!({"plugins": [{"$plugin": "b"}]}),
        );
        let plugins = result["plugins"].as_array().unwrap();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0]["$plugin"], "a");
        assert_eq!(plugins[1]["$plugin"], "b");
    }

    #[test]
    fn test_strategy_default_deep_merges_objects() {
        let merger = StrategyMerge::default();
        let result = merger.merge(
            json!({"output": {"path": "dist/", "libraryTarget": "umd"}}),
            json!({"output": {"filename": "app.js"}}),
        );
        assert_eq!(result["output"]["path"], "dist/");
        assert_eq!(result["output"]["libraryTarget"], "umd");
        assert_eq!(result["output"]["filename"], "app.js");
    }

    #[test]
    fn test_replace_strategy_ignores_nested_values() {
        let merger = StrategyMerge::default();
        let result = merger.merge_all(vec![
            Some(json!({"resolve": {"alias": {"vue$": "vue/dist/vue.esm.js", "deep": {"a": 1}}}})),
            Some(json!({"resolve": {"alias": {"deep": {"b": 2}}}})),
        ]);
        assert_eq!(result["resolve"]["alias"], json!({"deep": {"b": 2}}));
    }

    #[test]
    fn test_replace_strategy_on_externals_array() {
        let merger = StrategyMerge::default();
        let result = merger.merge_all(vec![
            Some(json!({"externals": ["fs", "path"]})),
            Some(json!({"externals": ["vue"]})),
        ]);
        assert_eq!(result["externals"], json!(["vue"]));
    }

    #[test]
    fn test_append_strategy_keeps_source_order() {
        let merger = StrategyMerge::default();
        let result = merger.merge_all(vec![
            Some(json!({"resolve": {"mainFields": ["module", "main"]}})),
            None,
            Some(json!({"resolve": {"mainFields": ["browser"]}})),
            Some(json!({"resolve": {"mainFields": ["jsnext"]}})),
        ]);
        assert_eq!(result["resolve"]["mainFields"], json!(["module", "main", "browser", "jsnext"]));
    }

    #[test]
    fn test_table_key_only_in_base_is_kept() {
        let merger = StrategyMerge::default();
        let result = merger.merge(
            json!({"resolve": {"alias": {"a": "b"}}}),
            json!({"resolve": {"modules": ["node_modules"]}}),
        );
        assert_eq!(result["resolve"]["alias"]["a"], "b");
        assert_eq!(result["resolve"]["modules"][0], "node_modules");
    }

    #[test]
    fn test_custom_table() {
        let merger = StrategyMerge::new(StrategyTable::new().with("module.rules", MergeStrategy::Replace));
        let result = merger.merge(
            json!({"module": {"rules": [1, 2]}, "plugins": [1]}),
            json!({"module": {"rules": [3]}, "plugins": [2]}),
        );
        assert_eq!(result["module"]["rules"], json!([3]));
        assert_eq!(result["plugins"], json!([1, 2]));
    }
}
