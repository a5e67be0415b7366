//! Bundler config composition
//!
//! Layer order for one build mode, lowest precedence first:
//! 1. `stats` preset from the output level
//! 2. preset common, 3. preset variant
//! 4. host common, 5. host variant
//! 6. code-analysis fragment (when enabled)
//! 7. build metadata (`DefinePlugin`)
//!
//! webpack keeps the first definition of a name, so the metadata keys are
//! removed from any earlier `DefinePlugin` before the metadata layer lands.
//!
//! Custom host plugins are appended to `plugins` after all of that.

use asset_presets::descriptor::{EXPORT_KEY, OPTIONS_KEY, PLUGIN_KEY};
use asset_presets::{plugin, plugin_export, ConfigFragments};
use serde_json::{json, Map, Value};

use crate::build_number::BuildInfo;
use crate::config::{CustomPlugin, StrategyMerge};
use crate::options::{BuildMode, OutputLevel, Variant};

fn fragment(fragments: &ConfigFragments, variant: Variant) -> Option<&Value> {
    match variant {
        Variant::Production => fragments.production.as_ref(),
        Variant::Development => fragments.development.as_ref(),
    }
}

/// The bundle-analyzer injection; writes a static report next to the bundle
pub fn analysis_fragment(mode: BuildMode) -> Value {
    json!({
        "plugins": [plugin_export(
            "webpack-bundle-analyzer",
            "BundleAnalyzerPlugin",
            json!({
                "analyzerMode": "static",
                "openAnalyzer": false,
                "reportFilename": format!("reports/bundle-{}.html", mode.as_str())
            })
        )]
    })
}

/// Metadata the build stamps into its output, as plain JSON
pub fn metadata_value(build: &BuildInfo, mode: BuildMode) -> Value {
    json!({
        "branch": build.branch,
        "buildNumber": build.number,
        "buildTime": build.time.timestamp_millis(),
        "mode": mode.as_str(),
        "development": mode.variant() == Variant::Development,
        "production": mode.variant() == Variant::Production,
    })
}

/// Names defined by [`metadata_layer`]
pub const METADATA_KEYS: &[&str] = &[
    "BUILD_BRANCH",
    "BUILD_NUMBER",
    "BUILD_TIME",
    "DEVELOPMENT_MODE_BUILD",
    "PRODUCTION_MODE_BUILD",
];

fn is_define_plugin(value: &Value) -> bool {
    value.get(PLUGIN_KEY).and_then(Value::as_str) == Some("webpack")
        && value.get(EXPORT_KEY).and_then(Value::as_str) == Some("DefinePlugin")
}

/// Drop metadata names from existing `DefinePlugin`s; drop a plugin left empty
fn strip_metadata_definitions(config: &mut Value) {
    let Some(Value::Array(plugins)) = config.get_mut("plugins") else {
        return;
    };
    plugins.retain_mut(|p| {
        if !is_define_plugin(p) {
            return true;
        }
        match p.get_mut(OPTIONS_KEY) {
            Some(Value::Object(definitions)) => {
                for key in METADATA_KEYS {
                    definitions.remove(*key);
                }
                !definitions.is_empty()
            }
            _ => true,
        }
    });
}

/// `webpack.DefinePlugin` layer; values are JSON-encoded source literals
pub fn metadata_layer(build: &BuildInfo, mode: BuildMode) -> Value {
    let literal = |v: Value| Value::String(v.to_string());
    let definitions = json!({
        "BUILD_BRANCH": literal(json!(build.branch.clone().unwrap_or_default())),
        "BUILD_NUMBER": literal(json!(build.number)),
        "BUILD_TIME": literal(json!(build.time.timestamp_millis())),
        "DEVELOPMENT_MODE_BUILD": literal(json!(mode.variant() == Variant::Development)),
        "PRODUCTION_MODE_BUILD": literal(json!(mode.variant() == Variant::Production)),
    });
    json!({ "plugins": [plugin_export("webpack", "DefinePlugin", definitions)] })
}

/// Custom plugin descriptor; the build metadata goes under `build`
pub fn custom_plugin_descriptor(custom: &CustomPlugin, metadata: &Value) -> Value {
    let mut options = match &custom.options {
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
        None => Map::new(),
    };
    options.insert("build".to_string(), metadata.clone());

    match &custom.export {
        Some(export) => plugin_export(&custom.module, export, Value::Object(options)),
        None => plugin(&custom.module, Value::Object(options)),
    }
}

/// Everything needed to produce a final bundler config per mode
pub struct ConfigComposer<'a> {
    pub preset: &'a ConfigFragments,
    pub host: Option<&'a ConfigFragments>,
    pub custom: &'a [CustomPlugin],
    pub code_analysis: bool,
    pub output_level: OutputLevel,
    pub build: &'a BuildInfo,
    pub merger: &'a StrategyMerge,
}

impl ConfigComposer<'_> {
    /// Preset and host fragments merged, plus the analysis fragment when on
    pub fn merge_sources(&self, mode: BuildMode) -> Value {
        let variant = mode.variant();
        let analysis = self.code_analysis || mode.forces_analysis();

        let sources = vec![
            Some(json!({ "stats": self.output_level.stats_preset() })),
            self.preset.common.clone(),
            fragment(self.preset, variant).cloned(),
            self.host.and_then(|h| h.common.clone()),
            self.host.and_then(|h| fragment(h, variant).cloned()),
            analysis.then(|| analysis_fragment(mode)),
        ];
        self.merger.merge_all(sources)
    }

    /// Final config for one mode
    pub fn compose(&self, mode: BuildMode) -> Value {
        let mut merged = self.merge_sources(mode);
        strip_metadata_definitions(&mut merged);
        let mut config = self.merger.merge(merged, metadata_layer(self.build, mode));

        if !self.custom.is_empty() {
            let metadata = metadata_value(self.build, mode);
            let extra: Vec<Value> = self
                .custom
                .iter()
                .map(|c| custom_plugin_descriptor(c, &metadata))
                .collect();
            append_plugins(&mut config, extra);
        }
        config
    }
}

fn append_plugins(config: &mut Value, extra: Vec<Value>) {
    let Some(map) = config.as_object_mut() else {
        return;
    };
    match map.get_mut("plugins") {
        Some(Value::Array(plugins)) => plugins.extend(extra),
        _ => {
            map.insert("plugins".to_string(), Value::Array(extra));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn build_info() -> BuildInfo {
        let time = Local.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap();
        BuildInfo::new(Some("master".to_string()), time)
    }

    fn preset() -> ConfigFragments {
        ConfigFragments {
            common: Some(json!({"output": {"path": "dist/"}, "resolve": {"mainFields": ["module", "main"]}})),
            production: Some(json!({"mode": "production"})),
            development: Some(json!({"mode": "development", "devtool": "source-map"})),
        }
    }

    fn plugin_names(config: &Value) -> Vec<String> {
        config["plugins"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| {
                let module = p["$plugin"].as_str().unwrap();
                match p.get("$export").and_then(Value::as_str) {
                    Some(e) => format!("{}.{}", module, e),
                    None => module.to_string(),
                }
            })
            .collect()
    }

    #[test]
    fn test_host_overrides_preset() {
        let preset = preset();
        let host = ConfigFragments {
            common: Some(json!({"output": {"path": "build/"}, "resolve": {"mainFields": ["browser"]}})),
            production: Some(json!({"devtool": false})),
            development: None,
        };
        let build = build_info();
        let merger = StrategyMerge::default();
        let composer = ConfigComposer {
            preset: &preset,
            host: Some(&host),
            custom: &[],
            code_analysis: false,
            output_level: OutputLevel::Normal,
            build: &build,
            merger: &merger,
        };

        let prod = composer.compose(BuildMode::Production);
        assert_eq!(prod["output"]["path"], "build/");
        assert_eq!(prod["mode"], "production");
        assert_eq!(prod["devtool"], false);
        assert_eq!(prod["resolve"]["mainFields"], json!(["module", "main", "browser"]));
        assert_eq!(prod["stats"], "normal");

        let dev = composer.compose(BuildMode::Development);
        assert_eq!(dev["devtool"], "source-map");
    }

    #[test]
    fn test_metadata_layer_last_and_not_shadowed() {
        let preset = preset();
        let host = ConfigFragments {
            common: Some(json!({"plugins": [{"$plugin": "html-webpack-plugin"}]})),
            ..Default::default()
        };
        let build = build_info();
        let merger = StrategyMerge::default();
        let composer = ConfigComposer {
            preset: &preset,
            host: Some(&host),
            custom: &[],
            code_analysis: false,
            output_level: OutputLevel::Min,
            build: &build,
            merger: &merger,
        };

        let config = composer.compose(BuildMode::Development);
        assert_eq!(plugin_names(&config), vec!["html-webpack-plugin", "webpack.DefinePlugin"]);
        let defs = &config["plugins"][1]["options"];
        assert_eq!(defs["BUILD_NUMBER"], "\"dev.20240307000\"");
        assert_eq!(defs["BUILD_BRANCH"], "\"master\"");
        assert_eq!(defs["DEVELOPMENT_MODE_BUILD"], "true");
        assert_eq!(defs["PRODUCTION_MODE_BUILD"], "false");
        assert_eq!(config["stats"], "errors-warnings");
    }

    #[test]
    fn test_code_analysis_mode_forces_analyzer() {
        let preset = preset();
        let build = build_info();
        let merger = StrategyMerge::default();
        let composer = ConfigComposer {
            preset: &preset,
            host: None,
            custom: &[],
            code_analysis: false,
            output_level: OutputLevel::Normal,
            build: &build,
            merger: &merger,
        };

        let analysis = composer.compose(BuildMode::CodeAnalysis);
        assert_eq!(analysis["mode"], "production");
        assert_eq!(
            plugin_names(&analysis),
            vec!["webpack-bundle-analyzer.BundleAnalyzerPlugin", "webpack.DefinePlugin"]
        );

        let prod = composer.compose(BuildMode::Production);
        assert_eq!(plugin_names(&prod), vec!["webpack.DefinePlugin"]);
    }

    #[test]
    fn test_analysis_flag_applies_to_every_mode() {
        let preset = preset();
        let build = build_info();
        let merger = StrategyMerge::default();
        let composer = ConfigComposer {
            preset: &preset,
            host: None,
            custom: &[],
            code_analysis: true,
            output_level: OutputLevel::Normal,
            build: &build,
            merger: &merger,
        };
        let dev = composer.compose(BuildMode::Development);
        assert_eq!(
            dev["plugins"][0]["options"]["reportFilename"],
            "reports/bundle-development.html"
        );
    }

    #[test]
    fn test_custom_plugins_appended_after_builtins() {
        let preset = preset();
        let build = build_info();
        let merger = StrategyMerge::default();
        let custom = vec![
            CustomPlugin {
                module: "./build/version-plugin.js".to_string(),
                export: None,
                options: Some(json!({"file": "version.json", "build": "ignored"})),
            },
            CustomPlugin {
                module: "banner".to_string(),
                export: Some("BannerPlugin".to_string()),
                options: None,
            },
        ];
        let composer = ConfigComposer {
            preset: &preset,
            host: None,
            custom: &custom,
            code_analysis: true,
            output_level: OutputLevel::Normal,
            build: &build,
            merger: &merger,
        };

        let config = composer.compose(BuildMode::Production);
        assert_eq!(
            plugin_names(&config),
            vec![
                "webpack-bundle-analyzer.BundleAnalyzerPlugin",
                "webpack.DefinePlugin",
                "./build/version-plugin.js",
                "banner.BannerPlugin"
            ]
        );
        let version = &config["plugins"][2]["options"];
        assert_eq!(version["file"], "version.json");
        assert_eq!(version["build"]["buildNumber"], "dev.20240307000");
        assert_eq!(version["build"]["production"], true);
    }

    #[test]
    fn test_preset_without_variant_fragments() {
        let preset = ConfigFragments {
            common: Some(json!({"target": "node", "mode": "development"})),
            production: None,
            development: None,
        };
        let build = build_info();
        let merger = StrategyMerge::default();
        let composer = ConfigComposer {
            preset: &preset,
            host: None,
            custom: &[],
            code_analysis: false,
            output_level: OutputLevel::Normal,
            build: &build,
            merger: &merger,
        };
        let config = composer.compose(BuildMode::Production);
        assert_eq!(config["target"], "node");
        assert_eq!(config["mode"], "development");
    }

    #[test]
    fn test_host_define_plugin_cannot_shadow_metadata() {
        let preset = preset();
        let host = ConfigFragments {
            common: Some(json!({"plugins": [
                plugin_export("webpack", "DefinePlugin", json!({"BUILD_NUMBER": "\"user\"", "API_URL": "\"/api\""})),
                plugin_export("webpack", "DefinePlugin", json!({"BUILD_TIME": "0"}))
            ]})),
            ..Default::default()
        };
        let build = build_info();
        let merger = StrategyMerge::default();
        let composer = ConfigComposer {
            preset: &preset,
            host: Some(&host),
            custom: &[],
            code_analysis: false,
            output_level: OutputLevel::Normal,
            build: &build,
            merger: &merger,
        };

        let config = composer.compose(BuildMode::Production);
        let numbers: Vec<&Value> = config["plugins"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["options"].get("BUILD_NUMBER"))
            .collect();
        assert_eq!(numbers, vec![&json!("\"dev.20240307000\"")]);
        assert_eq!(
            plugin_names(&config),
            vec!["webpack.DefinePlugin", "webpack.DefinePlugin"]
        );
        assert_eq!(config["plugins"][0]["options"], json!({"API_URL": "\"/api\""}));
    }
}
