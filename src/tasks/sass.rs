//! Sass compilation task

use std::fs;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde::Deserialize;
use tracing::info;

use super::process::ToolCommand;
use super::TaskError;

/// Output styles the compiler accepts
pub const SASS_STYLES: &[&str] = &["expanded", "compressed"];

pub const DEFAULT_SOURCE: &str = "src/styles/style.scss";
pub const DEFAULT_TARGET: &str = "dist/styles/style.css";
pub const DEFAULT_STYLE: &str = "compressed";

/// The host config `sass` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SassConfig {
    #[serde(default)]
    pub tasks: Vec<SassTask>,
}

/// One stylesheet to compile; every field has a default
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SassTask {
    pub source: Option<String>,
    pub target: Option<String>,
    pub style: Option<String>,
    pub source_map: Option<bool>,
}

/// A fully resolved compile request with absolute paths
#[derive(Debug, Clone, PartialEq)]
pub struct StyleJob {
    pub source: PathBuf,
    pub css_file: PathBuf,
    pub map_file: PathBuf,
    pub style: String,
    pub source_map: bool,
}

impl StyleJob {
    /// Apply defaults and resolve paths against `root`.
    ///
    /// The first `.css` in the target becomes `.min.css`; the map sits next
    /// to it as `.min.css.map`.
    pub fn resolve(task: &SassTask, root: &Path) -> Self {
        let source = task.source.as_deref().unwrap_or(DEFAULT_SOURCE);
        let target = task.target.as_deref().unwrap_or(DEFAULT_TARGET);
        let (css, map) = if target.contains(".css") {
            (
                target.replacen(".css", ".min.css", 1),
                target.replacen(".css", ".min.css.map", 1),
            )
        } else {
            (target.to_string(), format!("{}.map", target))
        };

        Self {
            source: root.join(source),
            css_file: root.join(css),
            map_file: root.join(map),
            style: task.style.clone().unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            source_map: task.source_map.unwrap_or(true),
        }
    }
}

/// A file written by the compiler
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub size: u64,
}

impl EmittedFile {
    /// Stat a freshly written file
    pub fn stat(path: &Path) -> Result<Self, TaskError> {
        let meta = fs::metadata(path).map_err(|e| TaskError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            size: meta.len(),
        })
    }

    pub fn report_line(&self) -> String {
        format!(
            "{} [{}] [created]",
            self.path.display(),
            ByteSize::b(self.size)
        )
    }
}

/// Compiles one stylesheet
pub trait StyleCompiler: Send + Sync {
    /// Write the CSS (and the map when enabled) and describe what was written
    fn compile(&self, job: &StyleJob) -> Result<Vec<EmittedFile>, TaskError>;
}

/// Compile every task in order and collect the report lines
pub fn run(
    compiler: &dyn StyleCompiler,
    config: &SassConfig,
    root: &Path,
) -> Result<Vec<String>, TaskError> {
    let mut lines = Vec::new();
    for task in &config.tasks {
        let job = StyleJob::resolve(task, root);
        info!(source = %job.source.display(), "compiling stylesheet");
        let files = compiler.compile(&job)?;
        lines.extend(files.iter().map(EmittedFile::report_line));
        if !job.source_map {
            lines.push(format!("CSS map is disabled for {}", job.css_file.display()));
        }
    }
    Ok(lines)
}

/// dart-sass command line
pub struct SassCli {
    command: ToolCommand,
    root: PathBuf,
}

impl SassCli {
    pub fn new(command: ToolCommand, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }

    fn args(job: &StyleJob) -> Vec<String> {
        vec![
            format!("--style={}", job.style),
            if job.source_map {
                "--source-map".to_string()
            } else {
                "--no-source-map".to_string()
            },
            job.source.to_string_lossy().to_string(),
            job.css_file.to_string_lossy().to_string(),
        ]
    }
}

impl StyleCompiler for SassCli {
    fn compile(&self, job: &StyleJob) -> Result<Vec<EmittedFile>, TaskError> {
        if let Some(parent) = job.css_file.parent() {
            fs::create_dir_all(parent).map_err(|e| TaskError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        self.command.run_checked(&Self::args(job), &self.root)?;

        let mut files = vec![EmittedFile::stat(&job.css_file)?];
        if job.source_map {
            files.push(EmittedFile::stat(&job.map_file)?);
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let job = StyleJob::resolve(&SassTask::default(), Path::new("/p"));
        assert_eq!(job.source, PathBuf::from("/p/src/styles/style.scss"));
        assert_eq!(job.css_file, PathBuf::from("/p/dist/styles/style.min.css"));
        assert_eq!(job.map_file, PathBuf::from("/p/dist/styles/style.min.css.map"));
        assert_eq!(job.style, "compressed");
        assert!(job.source_map);
    }

    #[test]
    fn test_resolve_overrides() {
        let task = SassTask {
            source: Some("skins/dark.scss".to_string()),
            target: Some("out/dark.css".to_string()),
            style: Some("expanded".to_string()),
            source_map: Some(false),
        };
        let job = StyleJob::resolve(&task, Path::new("/p"));
        assert_eq!(job.css_file, PathBuf::from("/p/out/dark.min.css"));
        assert_eq!(job.style, "expanded");
        assert!(!job.source_map);
    }

    #[test]
    fn test_target_without_css_extension() {
        let task = SassTask {
            target: Some("out/theme".to_string()),
            ..Default::default()
        };
        let job = StyleJob::resolve(&task, Path::new("/p"));
        assert_eq!(job.css_file, PathBuf::from("/p/out/theme"));
        assert_eq!(job.map_file, PathBuf::from("/p/out/theme.map"));
    }

    #[test]
    fn test_task_deserializes_camel_case() {
        let task: SassTask = serde_json::from_value(serde_json::json!({"sourceMap": false})).unwrap();
        assert_eq!(task.source_map, Some(false));
    }

    #[test]
    fn test_cli_args() {
        let job = StyleJob::resolve(&SassTask::default(), Path::new("/p"));
        let args = SassCli::args(&job);
        assert_eq!(args[0], "--style=compressed");
        assert_eq!(args[1], "--source-map");
        assert!(args[3].ends_with("style.min.css"));
    }

    #[test]
    fn test_report_line_contains_size() {
        let file = EmittedFile {
            path: PathBuf::from("/p/dist/style.min.css"),
            size: 2048,
        };
        let line = file.report_line();
        assert!(line.starts_with("/p/dist/style.min.css ["));
        assert!(line.ends_with("[created]"));
    }

    #[test]
    fn test_stat_missing_file() {
        let err = EmittedFile::stat(Path::new("/nonexistent/style.css")).unwrap_err();
        assert!(matches!(err, TaskError::Io { .. }));
    }
}
