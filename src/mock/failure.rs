//! Failure injection for mock tools

use std::collections::HashMap;
use std::time::Duration;

/// Which delegated tool a failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Imagemin,
    Sass,
    Webpack,
}

/// Failure configuration for a tool
#[derive(Debug, Clone, Default)]
pub struct FailureConfig {
    /// Error message to return (if any)
    pub message: Option<String>,
    /// Delay before answering
    pub delay: Option<Duration>,
    /// Number of calls to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn delay(duration: Duration) -> Self {
        Self {
            delay: Some(duration),
            ..Self::default()
        }
    }

    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Per-tool failure injections
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<Tool, FailureConfig>,
    call_counts: HashMap<Tool, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, tool: Tool, config: FailureConfig) {
        self.configs.insert(tool, config);
        self.call_counts.insert(tool, 0);
    }

    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Delay to apply before the call, if any
    pub fn delay(&self, tool: Tool) -> Option<Duration> {
        self.configs.get(&tool).and_then(|c| c.delay)
    }

    /// Count a call and return the error message it should fail with
    pub fn check(&mut self, tool: Tool) -> Option<String> {
        let config = self.configs.get(&tool)?;
        let count = self.call_counts.entry(tool).or_insert(0);
        *count += 1;

        if let Some(limit) = config.fail_count {
            if *count > limit {
                return None;
            }
        }
        config.message.clone()
    }
}
