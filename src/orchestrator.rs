//! Build orchestration
//!
//! Runs the selected modules against an already loaded host config:
//! - `imagemin` and `sass` run concurrently and are joined together
//! - `webpack` starts only once both primary tasks succeeded
//! - bundler modes run one after another, development before production
//!
//! A module with no host configuration is skipped and counts as success.

use std::path::PathBuf;
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use asset_presets::{Preset, PresetError, PresetRegistry};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::build_number::BuildInfo;
use crate::compose::ConfigComposer;
use crate::config::{ConfigError, HostConfig, StrategyMerge};
use crate::options::{BuildMode, BuildOptions, Module};
use crate::summary::{RunReport, TaskReport};
use crate::tasks::{imagemin, sass, TaskError, ToolError, Toolset};

const NO_SETTINGS: &str = "no settings are provided";

/// Orchestration errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("tool setup error: {0}")]
    ToolSetup(#[from] ToolError),

    #[error("{} task failed: {source}", .module.label())]
    Task {
        module: Module,
        #[source]
        source: TaskError,
    },
}

impl BuildError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Usage(_) => 1,
            BuildError::Preset(_) => 1,
            BuildError::Config(_) => 1,
            BuildError::ToolSetup(_) => 1,
            BuildError::Task { .. } => 2,
        }
    }

    /// The module whose task failed, if any
    pub fn failed_module(&self) -> Option<Module> {
        match self {
            BuildError::Task { module, .. } => Some(*module),
            _ => None,
        }
    }
}

/// Result type for orchestration
pub type BuildResult<T> = Result<T, BuildError>;

fn task_failed(module: Module) -> impl FnOnce(TaskError) -> BuildError {
    move |source| BuildError::Task { module, source }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn join_task(module: Module, handle: ScopedJoinHandle<'_, BuildResult<TaskReport>>) -> BuildResult<TaskReport> {
    handle
        .join()
        .unwrap_or_else(|_| Err(task_failed(module)(TaskError::Failed("task panicked".to_string()))))
}

/// Runs one invocation
pub struct Orchestrator<'a> {
    options: BuildOptions,
    preset: &'a Preset,
    host: HostConfig,
    build: BuildInfo,
    tools: Toolset,
    root: PathBuf,
    merger: StrategyMerge,
}

impl<'a> Orchestrator<'a> {
    /// Fails when the requested preset is not in `registry`
    pub fn new(
        options: BuildOptions,
        registry: &'a PresetRegistry,
        host: HostConfig,
        build: BuildInfo,
        tools: Toolset,
        root: impl Into<PathBuf>,
    ) -> BuildResult<Self> {
        let preset = registry.get(&options.preset)?;
        Ok(Self {
            options,
            preset,
            host,
            build,
            tools,
            root: root.into(),
            merger: StrategyMerge::default(),
        })
    }

    /// Modules this invocation runs, in order
    pub fn modules(&self) -> Vec<Module> {
        self.options.module.expand()
    }

    /// Bundler modes this invocation runs, in order
    pub fn modes(&self) -> Vec<BuildMode> {
        self.options.mode.expand()
    }

    fn composer(&self) -> ConfigComposer<'_> {
        ConfigComposer {
            preset: &self.preset.webpack,
            host: self.host.webpack.as_ref(),
            custom: self.host.custom_plugins(),
            code_analysis: self.options.code_analysis,
            output_level: self.options.output_level,
            build: &self.build,
            merger: &self.merger,
        }
    }

    /// Final bundler config for one mode
    pub fn merged_config(&self, mode: BuildMode) -> Value {
        self.composer().compose(mode)
    }

    /// Run every selected module
    pub fn run(&self) -> BuildResult<RunReport> {
        let start = Instant::now();
        info!(
            module = %self.options.module,
            mode = %self.options.mode,
            preset = self.preset.name,
            build = %self.build.number,
            "starting build"
        );

        let mut tasks = Vec::new();
        match self.options.module {
            Module::All => {
                tasks.extend(self.run_primary()?);
                tasks.extend(self.run_webpack()?);
            }
            Module::Imagemin => tasks.push(self.run_imagemin()?),
            Module::Sass => tasks.push(self.run_sass()?),
            Module::Webpack => tasks.extend(self.run_webpack()?),
        }

        Ok(RunReport {
            tasks,
            duration_ms: elapsed_ms(start),
        })
    }

    /// imagemin and sass side by side; the first failure in task order wins
    fn run_primary(&self) -> BuildResult<Vec<TaskReport>> {
        let (images, styles) = thread::scope(|scope| {
            let images = scope.spawn(|| self.run_imagemin());
            let styles = scope.spawn(|| self.run_sass());
            (
                join_task(Module::Imagemin, images),
                join_task(Module::Sass, styles),
            )
        });
        Ok(vec![images?, styles?])
    }

    fn run_imagemin(&self) -> BuildResult<TaskReport> {
        let Some(config) = &self.host.imagemin else {
            warn!("Imagemin task will be skipped because {}", NO_SETTINGS);
            return Ok(TaskReport::skipped(Module::Imagemin, NO_SETTINGS));
        };

        let start = Instant::now();
        let lines = imagemin::run(self.tools.images.as_ref(), config)
            .map_err(task_failed(Module::Imagemin))?;
        Ok(TaskReport::completed(Module::Imagemin, lines, elapsed_ms(start)))
    }

    fn run_sass(&self) -> BuildResult<TaskReport> {
        let Some(config) = &self.host.sass else {
            warn!("Sass task will be skipped because {}", NO_SETTINGS);
            return Ok(TaskReport::skipped(Module::Sass, NO_SETTINGS));
        };

        let start = Instant::now();
        let lines = sass::run(self.tools.styles.as_ref(), config, &self.root)
            .map_err(task_failed(Module::Sass))?;
        Ok(TaskReport::completed(Module::Sass, lines, elapsed_ms(start)))
    }

    /// One bundler run per mode, strictly sequential
    fn run_webpack(&self) -> BuildResult<Vec<TaskReport>> {
        if self.host.webpack.is_none() {
            warn!("Webpack task will be skipped because {}", NO_SETTINGS);
            return Ok(vec![TaskReport::skipped(Module::Webpack, NO_SETTINGS)]);
        }

        let composer = self.composer();
        let mut reports = Vec::new();
        for mode in self.modes() {
            let start = Instant::now();
            let config = composer.compose(mode);
            info!(%mode, "running webpack");

            let stats = self
                .tools
                .bundler
                .bundle(mode, &config)
                .map_err(task_failed(Module::Webpack))?;

            let mut details = Vec::new();
            if let Some(hash) = &stats.hash {
                details.push(format!("hash: {}", hash));
            }
            for warning in &stats.warnings {
                warn!(%mode, "{}", warning);
                details.push(format!("warning: {}", warning));
            }
            reports.push(
                TaskReport::completed(Module::Webpack, details, elapsed_ms(start)).with_mode(mode),
            );
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(BuildError::Usage("bad".to_string()).exit_code(), 1);
        assert_eq!(
            BuildError::Config(ConfigError::IoError("missing".to_string())).exit_code(),
            1
        );
        let task = BuildError::Task {
            module: Module::Sass,
            source: TaskError::Failed("boom".to_string()),
        };
        assert_eq!(task.exit_code(), 2);
        assert_eq!(task.failed_module(), Some(Module::Sass));
    }

    #[test]
    fn test_task_error_names_module() {
        let err = BuildError::Task {
            module: Module::Imagemin,
            source: TaskError::Failed("no such file".to_string()),
        };
        assert_eq!(err.to_string(), "Imagemin task failed: no such file");
    }
}
