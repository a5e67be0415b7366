//! Bundler task
//!
//! webpack cannot read plugin instances or regular expressions from JSON,
//! so each merged config is written next to a small CommonJS loader that
//! revives the descriptors before handing the config to webpack.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::process::{ToolCommand, ToolError};
use super::TaskError;
use crate::options::BuildMode;

const LOADER_TEMPLATE: &str = r#"// Generated by asset-build; rewritten on every run.
const path = require('path')
const config = require('./__CONFIG_FILE__')

function load (name, exportName) {
  const mod = require(require.resolve(name, { paths: [process.cwd()] }))
  if (exportName) return mod[exportName]
  return mod && mod.__esModule && mod.default ? mod.default : mod
}

function revive (value) {
  if (Array.isArray(value)) return value.map(revive)
  if (value === null || typeof value !== 'object') return value
  if (typeof value.$regex === 'string') return new RegExp(value.$regex)
  if (typeof value.$plugin === 'string') {
    const Plugin = load(value.$plugin, value.$export)
    return 'options' in value ? new Plugin(revive(value.options)) : new Plugin()
  }
  if (typeof value.$require === 'string') return load(value.$require, value.$export)
  const out = {}
  for (const [key, item] of Object.entries(value)) out[key] = revive(item)
  return out
}

const revived = revive(config)
if (revived.context) revived.context = path.resolve(revived.context)
if (revived.output && revived.output.path) revived.output.path = path.resolve(revived.output.path)
module.exports = revived
"#;

/// Errors and warnings extracted from a bundler run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleStats {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub duration_ms: Option<u64>,
    pub hash: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatsMessage {
    Text(String),
    Detailed {
        message: String,
        #[serde(rename = "moduleName")]
        module_name: Option<String>,
    },
}

impl StatsMessage {
    fn into_text(self) -> String {
        match self {
            StatsMessage::Text(text) => text,
            StatsMessage::Detailed {
                message,
                module_name: Some(module),
            } => format!("{}: {}", module, message),
            StatsMessage::Detailed { message, .. } => message,
        }
    }
}

#[derive(Deserialize)]
struct RawStats {
    #[serde(default)]
    errors: Vec<StatsMessage>,
    #[serde(default)]
    warnings: Vec<StatsMessage>,
    time: Option<u64>,
    hash: Option<String>,
}

impl BundleStats {
    /// Parse webpack's `--json` output (webpack 4 strings or webpack 5 objects)
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawStats = serde_json::from_str(json)?;
        Ok(Self {
            errors: raw.errors.into_iter().map(StatsMessage::into_text).collect(),
            warnings: raw.warnings.into_iter().map(StatsMessage::into_text).collect(),
            duration_ms: raw.time,
            hash: raw.hash,
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Runs one bundler build with a fully merged config
pub trait Bundler: Send + Sync {
    fn bundle(&self, mode: BuildMode, config: &Value) -> Result<BundleStats, TaskError>;
}

/// webpack-cli launched as a child process
pub struct WebpackCli {
    command: ToolCommand,
    root: PathBuf,
    scratch_dir: PathBuf,
}

impl WebpackCli {
    /// `scratch_dir` is resolved against `root`
    pub fn new(command: ToolCommand, root: impl Into<PathBuf>, scratch_dir: impl AsRef<Path>) -> Self {
        let root = root.into();
        let scratch_dir = root.join(scratch_dir);
        Self {
            command,
            root,
            scratch_dir,
        }
    }

    /// Paths of the generated config, loader and stats files for a mode
    pub fn files_for(&self, mode: BuildMode) -> (PathBuf, PathBuf, PathBuf) {
        let stem = format!("webpack.{}", mode.as_str());
        (
            self.scratch_dir.join(format!("{}.json", stem)),
            self.scratch_dir.join(format!("{}.config.cjs", stem)),
            self.scratch_dir.join(format!("{}.stats.json", stem)),
        )
    }

    /// Write the merged config and its loader; returns the loader path
    pub fn write_config(&self, mode: BuildMode, config: &Value) -> Result<PathBuf, TaskError> {
        fs::create_dir_all(&self.scratch_dir).map_err(|e| io_error(&self.scratch_dir, e))?;

        let (config_path, loader_path, _) = self.files_for(mode);
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| TaskError::InvalidConfig(e.to_string()))?;
        fs::write(&config_path, json).map_err(|e| io_error(&config_path, e))?;

        let config_file = config_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let loader = LOADER_TEMPLATE.replace("__CONFIG_FILE__", &config_file);
        fs::write(&loader_path, loader).map_err(|e| io_error(&loader_path, e))?;

        Ok(loader_path)
    }
}

impl Bundler for WebpackCli {
    fn bundle(&self, mode: BuildMode, config: &Value) -> Result<BundleStats, TaskError> {
        let loader_path = self.write_config(mode, config)?;
        let (_, _, stats_path) = self.files_for(mode);
        if stats_path.exists() {
            fs::remove_file(&stats_path).map_err(|e| io_error(&stats_path, e))?;
        }

        let args = vec![
            "--config".to_string(),
            loader_path.to_string_lossy().to_string(),
            "--json".to_string(),
            stats_path.to_string_lossy().to_string(),
        ];
        let output = self.command.run(&args, &self.root)?;

        let stats = match fs::read_to_string(&stats_path) {
            Ok(json) => BundleStats::parse(&json).map_err(|e| {
                TaskError::InvalidConfig(format!("unreadable stats {}: {}", stats_path.display(), e))
            })?,
            Err(e) => {
                debug!("no stats written to {}: {}", stats_path.display(), e);
                BundleStats::default()
            }
        };

        if stats.has_errors() {
            return Err(TaskError::Compilation {
                mode,
                count: stats.errors.len(),
                first: stats.errors[0].clone(),
            });
        }
        if !output.success() {
            return Err(ToolError::ExitFailure {
                program: self.command.name().to_string(),
                status: output.status.to_string(),
                stderr: output.stderr,
            }
            .into());
        }
        Ok(stats)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> TaskError {
    TaskError::Io {
        path: path.to_path_buf(),
        source,
    }
}
