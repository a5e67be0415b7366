//! Launching external tools

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::debug;

/// Tool launch errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("no program configured for {0}")]
    EmptyCommand(String),

    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}{}", stderr_suffix(.stderr))]
    ExitFailure {
        program: String,
        status: String,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// Captured result of a finished tool
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Non-empty stdout lines
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A program plus its leading arguments, e.g. `npx sass`
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    name: String,
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    /// `name` identifies the tool in error messages
    pub fn new(name: &str, command_line: &[String]) -> Result<Self, ToolError> {
        let (program, args) = command_line
            .split_first()
            .ok_or_else(|| ToolError::EmptyCommand(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render for logs
    pub fn display_with(&self, extra: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .chain(extra.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion in `work_dir`, whatever the exit status
    pub fn run(&self, extra: &[String], work_dir: &Path) -> Result<ToolOutput, ToolError> {
        debug!(command = %self.display_with(extra), dir = %work_dir.display(), "launching {}", self.name);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::SpawnFailed {
                program: self.program.clone(),
                source: e,
            })?;

        // Drain stderr on its own thread so a chatty tool cannot block on a full pipe
        let stderr = child.stderr.take();
        let name = self.name.clone();
        let stderr_handle = std::thread::spawn(move || {
            let mut collected = String::new();
            if let Some(stderr) = stderr {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    debug!("[{} stderr] {}", name, line);
                    collected.push_str(&line);
                    collected.push('\n');
                }
            }
            collected
        });

        let mut stdout = String::new();
        if let Some(out) = child.stdout.take() {
            for line in BufReader::new(out).lines().map_while(Result::ok) {
                debug!("[{}] {}", self.name, line);
                stdout.push_str(&line);
                stdout.push('\n');
            }
        }

        let status = child.wait().map_err(|e| ToolError::SpawnFailed {
            program: self.program.clone(),
            source: e,
        })?;
        let stderr = stderr_handle.join().unwrap_or_default();

        Ok(ToolOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// Run and fail on a non-zero exit status
    pub fn run_checked(&self, extra: &[String], work_dir: &Path) -> Result<ToolOutput, ToolError> {
        let output = self.run(extra, work_dir)?;
        if !output.success() {
            return Err(ToolError::ExitFailure {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}
