//! Per-task outcomes of one invocation

use std::fmt::Write as _;

use crate::options::{BuildMode, Module};

/// How a task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    /// No configuration for the module; nothing ran
    Skipped { reason: String },
}

/// Outcome of one module (and one mode, for the bundler)
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub module: Module,
    pub mode: Option<BuildMode>,
    pub status: TaskStatus,

    /// Lines reported by the tool (created files, warnings)
    pub details: Vec<String>,

    pub duration_ms: u64,
}

impl TaskReport {
    pub fn completed(module: Module, details: Vec<String>, duration_ms: u64) -> Self {
        Self {
            module,
            mode: None,
            status: TaskStatus::Completed,
            details,
            duration_ms,
        }
    }

    pub fn skipped(module: Module, reason: impl Into<String>) -> Self {
        Self {
            module,
            mode: None,
            status: TaskStatus::Skipped {
                reason: reason.into(),
            },
            details: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, TaskStatus::Skipped { .. })
    }

    fn title(&self) -> String {
        match self.mode {
            Some(mode) => format!("{} ({})", self.module.label(), mode),
            None => self.module.label().to_string(),
        }
    }
}

/// All task reports of a successful run, in execution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub tasks: Vec<TaskReport>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_skipped()).count()
    }

    pub fn skipped(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_skipped()).count()
    }

    /// Modules in the order they finished
    pub fn modules(&self) -> Vec<Module> {
        self.tasks.iter().map(|t| t.module).collect()
    }

    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for task in &self.tasks {
            match &task.status {
                TaskStatus::Completed => {
                    let _ = writeln!(out, "{} task completed in {} ms", task.title(), task.duration_ms);
                    for line in &task.details {
                        let _ = writeln!(out, "    {}", line);
                    }
                }
                TaskStatus::Skipped { reason } => {
                    let _ = writeln!(out, "{} task skipped: {}", task.title(), reason);
                }
            }
        }
        let _ = write!(
            out,
            "{} task(s) completed, {} skipped in {} ms",
            self.completed(),
            self.skipped(),
            self.duration_ms
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let report = RunReport {
            tasks: vec![
                TaskReport::skipped(Module::Imagemin, "no settings"),
                TaskReport::completed(Module::Sass, vec!["a.css".to_string()], 10),
                TaskReport::completed(Module::Webpack, vec![], 50).with_mode(BuildMode::Production),
            ],
            duration_ms: 70,
        };
        assert_eq!(report.completed(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.modules(), vec![Module::Imagemin, Module::Sass, Module::Webpack]);
    }

    #[test]
    fn test_to_human() {
        let report = RunReport {
            tasks: vec![
                TaskReport::skipped(Module::Imagemin, "no settings provided"),
                TaskReport::completed(Module::Webpack, vec!["warning: big".to_string()], 5)
                    .with_mode(BuildMode::Development),
            ],
            duration_ms: 9,
        };
        let text = report.to_human();
        assert!(text.contains("Imagemin task skipped: no settings provided"));
        assert!(text.contains("Webpack (development) task completed in 5 ms"));
        assert!(text.contains("    warning: big"));
        assert!(text.ends_with("1 task(s) completed, 1 skipped in 9 ms"));
    }
}
