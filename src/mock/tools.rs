//! Recording tool mocks

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::Value;

use super::failure::{FailureConfig, FailureInjector, Tool};
use crate::options::BuildMode;
use crate::tasks::imagemin::ImageTask;
use crate::tasks::sass::{EmittedFile, StyleJob};
use crate::tasks::{BundleStats, Bundler, ImageOptimizer, StyleCompiler, TaskError, Toolset};

/// One recorded tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Optimize { target: String },
    Compile { source: PathBuf },
    Bundle { mode: BuildMode, config: Value },
}

impl ToolCall {
    pub fn tool(&self) -> Tool {
        match self {
            ToolCall::Optimize { .. } => Tool::Imagemin,
            ToolCall::Compile { .. } => Tool::Sass,
            ToolCall::Bundle { .. } => Tool::Webpack,
        }
    }
}

/// Calls in the order they were made, shared by every mock
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<ToolCall>>>,
}

impl CallLog {
    fn record(&self, call: ToolCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Tools in call order
    pub fn tools(&self) -> Vec<Tool> {
        self.calls().iter().map(ToolCall::tool).collect()
    }

    pub fn count(&self, tool: Tool) -> usize {
        self.calls().iter().filter(|c| c.tool() == tool).count()
    }

    /// Bundler modes in call order
    pub fn bundle_modes(&self) -> Vec<BuildMode> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ToolCall::Bundle { mode, .. } => Some(mode),
                _ => None,
            })
            .collect()
    }

    /// The config handed to the bundler for `mode`
    pub fn bundle_config(&self, mode: BuildMode) -> Option<Value> {
        self.calls().into_iter().find_map(|c| match c {
            ToolCall::Bundle { mode: m, config } if m == mode => Some(config),
            _ => None,
        })
    }
}

#[derive(Clone)]
struct Shared {
    log: CallLog,
    failures: Arc<Mutex<FailureInjector>>,
}

impl Shared {
    /// Sleep for an injected delay, record the call, then apply failures
    fn call(&self, tool: Tool, call: ToolCall) -> Result<(), TaskError> {
        let delay = self.failures.lock().unwrap().delay(tool);
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.log.record(call);
        match self.failures.lock().unwrap().check(tool) {
            Some(message) => Err(TaskError::Failed(message)),
            None => Ok(()),
        }
    }
}

pub struct MockImageOptimizer {
    shared: Shared,
}

impl ImageOptimizer for MockImageOptimizer {
    fn optimize(&self, task: &ImageTask) -> Result<Vec<String>, TaskError> {
        self.shared.call(
            Tool::Imagemin,
            ToolCall::Optimize {
                target: task.target.clone(),
            },
        )?;
        Ok(vec![format!("Images optimized into {}", task.target)])
    }
}

pub struct MockStyleCompiler {
    shared: Shared,
}

impl StyleCompiler for MockStyleCompiler {
    fn compile(&self, job: &StyleJob) -> Result<Vec<EmittedFile>, TaskError> {
        self.shared.call(
            Tool::Sass,
            ToolCall::Compile {
                source: job.source.clone(),
            },
        )?;
        let mut files = vec![EmittedFile {
            path: job.css_file.clone(),
            size: 1024,
        }];
        if job.source_map {
            files.push(EmittedFile {
                path: job.map_file.clone(),
                size: 512,
            });
        }
        Ok(files)
    }
}

pub struct MockBundler {
    shared: Shared,
    stats: Arc<Mutex<BundleStats>>,
}

impl Bundler for MockBundler {
    fn bundle(&self, mode: BuildMode, config: &Value) -> Result<BundleStats, TaskError> {
        self.shared.call(
            Tool::Webpack,
            ToolCall::Bundle {
                mode,
                config: config.clone(),
            },
        )?;
        Ok(self.stats.lock().unwrap().clone())
    }
}

/// Factory for a mocked [`Toolset`] plus handles to inspect it afterwards
#[derive(Clone, Default)]
pub struct MockTools {
    log: CallLog,
    failures: Arc<Mutex<FailureInjector>>,
    stats: Arc<Mutex<BundleStats>>,
}

impl MockTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    pub fn inject(&self, tool: Tool, config: FailureConfig) {
        self.failures.lock().unwrap().inject(tool, config);
    }

    pub fn inject_error(&self, tool: Tool, message: impl Into<String>) {
        self.inject(tool, FailureConfig::error(message));
    }

    /// Stats every bundler call returns
    pub fn set_bundle_stats(&self, stats: BundleStats) {
        *self.stats.lock().unwrap() = stats;
    }

    pub fn toolset(&self) -> Toolset {
        let shared = Shared {
            log: self.log.clone(),
            failures: Arc::clone(&self.failures),
        };
        Toolset::new(
            Box::new(MockImageOptimizer {
                shared: shared.clone(),
            }),
            Box::new(MockStyleCompiler {
                shared: shared.clone(),
            }),
            Box::new(MockBundler {
                shared,
                stats: Arc::clone(&self.stats),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::sass::SassTask;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn test_shared_log_across_tools() {
        let mock = MockTools::new();
        let tools = mock.toolset();

        let job = StyleJob::resolve(&SassTask::default(), Path::new("/p"));
        tools.styles.compile(&job).unwrap();
        tools.bundler.bundle(BuildMode::Development, &json!({})).unwrap();

        assert_eq!(mock.log().tools(), vec![Tool::Sass, Tool::Webpack]);
        assert_eq!(mock.log().bundle_modes(), vec![BuildMode::Development]);
    }

    #[test]
    fn test_injected_error_still_recorded() {
        let mock = MockTools::new();
        mock.inject_error(Tool::Webpack, "Module not found");
        let tools = mock.toolset();

        let err = tools.bundler.bundle(BuildMode::Production, &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Module not found");
        assert_eq!(mock.log().count(Tool::Webpack), 1);
    }

    #[test]
    fn test_compile_reports_map_only_when_enabled() {
        let mock = MockTools::new();
        let tools = mock.toolset();
        let task = SassTask {
            source_map: Some(false),
            ..SassTask::default()
        };
        let job = StyleJob::resolve(&task, Path::new("/p"));
        let files = tools.styles.compile(&job).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("/p/dist/styles/style.min.css"));
    }
}
