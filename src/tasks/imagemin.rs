//! Image optimization task

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::process::ToolCommand;
use super::TaskError;

/// The host config `imagemin` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageminConfig {
    #[serde(default)]
    pub tasks: Vec<ImageTask>,
}

/// One glob or several
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SourceGlobs {
    One(String),
    Many(Vec<String>),
}

impl SourceGlobs {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            SourceGlobs::One(p) => vec![p.as_str()],
            SourceGlobs::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

/// A set of images optimized into one output directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageTask {
    pub source: SourceGlobs,
    pub target: String,

    /// imagemin plugin names, e.g. "mozjpeg"; tool defaults when empty
    #[serde(default)]
    pub plugins: Vec<String>,
}

/// Optimizes one image task
pub trait ImageOptimizer: Send + Sync {
    /// Returns the tool's report lines
    fn optimize(&self, task: &ImageTask) -> Result<Vec<String>, TaskError>;
}

/// Optimize every task in order
pub fn run(optimizer: &dyn ImageOptimizer, config: &ImageminConfig) -> Result<Vec<String>, TaskError> {
    let mut lines = Vec::new();
    for (i, task) in config.tasks.iter().enumerate() {
        if task.source.patterns().is_empty() {
            return Err(TaskError::InvalidConfig(format!(
                "imagemin.tasks[{}] has no source patterns",
                i
            )));
        }
        info!(target_dir = %task.target, "optimizing images");
        lines.extend(optimizer.optimize(task)?);
    }
    Ok(lines)
}

/// imagemin-cli command line
pub struct ImageminCli {
    command: ToolCommand,
    root: PathBuf,
}

impl ImageminCli {
    pub fn new(command: ToolCommand, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }

    fn args(task: &ImageTask) -> Vec<String> {
        let mut args: Vec<String> = task
            .source
            .patterns()
            .into_iter()
            .map(str::to_string)
            .collect();
        args.push(format!("--out-dir={}", task.target));
        args.extend(task.plugins.iter().map(|p| format!("--plugin={}", p)));
        args
    }

    fn out_dir(&self, task: &ImageTask) -> PathBuf {
        let target = Path::new(&task.target);
        if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.root.join(target)
        }
    }
}

impl ImageOptimizer for ImageminCli {
    fn optimize(&self, task: &ImageTask) -> Result<Vec<String>, TaskError> {
        let out_dir = self.out_dir(task);
        fs::create_dir_all(&out_dir).map_err(|e| TaskError::Io {
            path: out_dir.clone(),
            source: e,
        })?;

        let output = self.command.run_checked(&Self::args(task), &self.root)?;
        let mut lines = output.lines();
        if lines.is_empty() {
            lines.push(format!("Images optimized into {}", out_dir.display()));
        }
        Ok(lines)
    }
}
