//! Build numbers
//!
//! A build number looks like `<branch>.<YYYYMMDDCCC>` where `CCC` counts the
//! two-minute intervals elapsed since local midnight. `master` is reported
//! as `dev`; builds from `production` carry the timestamp alone.

use std::io;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike};
use thiserror::Error;
use tracing::warn;

/// Branch whose builds carry no prefix
pub const PRODUCTION_BRANCH: &str = "production";

const MASTER_BRANCH: &str = "master";
const MASTER_ALIAS: &str = "dev";

/// Branch lookup errors
#[derive(Debug, Error)]
pub enum BuildNumberError {
    #[error("failed to run git: {0}")]
    GitUnavailable(#[from] io::Error),

    #[error("cannot determine the current branch: {0}")]
    NoBranch(String),
}

/// Name of the checked-out branch of the repository containing `dir`.
///
/// Fails outside a repository and on a detached HEAD; callers pick the
/// fallback.
pub fn current_branch(dir: &Path) -> Result<String, BuildNumberError> {
    let output = Command::new("git")
        .args(["symbolic-ref", "--short", "HEAD"])
        .current_dir(dir)
        .output()?;

    if !output.status.success() {
        return Err(BuildNumberError::NoBranch(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if branch.is_empty() {
        return Err(BuildNumberError::NoBranch("git reported an empty branch name".to_string()));
    }
    Ok(branch)
}

/// `YYYYMMDDCCC` for the given local time
pub fn timestamp_code(at: &NaiveDateTime) -> String {
    let counter = (at.hour() * 60 + at.minute()) / 2;
    format!(
        "{:04}{:02}{:02}{:03}",
        at.year(),
        at.month(),
        at.day(),
        counter
    )
}

/// Build number for `branch` at local time `at`
pub fn format_build_number(branch: &str, at: &NaiveDateTime) -> String {
    let timestamp = timestamp_code(at);
    match branch {
        PRODUCTION_BRANCH => timestamp,
        MASTER_BRANCH => format!("{}.{}", MASTER_ALIAS, timestamp),
        other => format!("{}.{}", other, timestamp),
    }
}

/// Metadata stamped into every bundler config
#[derive(Debug, Clone, PartialEq)]
pub struct BuildInfo {
    /// Source-control branch, `None` when it could not be determined
    pub branch: Option<String>,

    pub number: String,

    pub time: DateTime<Local>,
}

impl BuildInfo {
    /// Without a branch the number is the bare timestamp code
    pub fn new(branch: Option<String>, time: DateTime<Local>) -> Self {
        let local = time.naive_local();
        let number = match &branch {
            Some(b) => format_build_number(b, &local),
            None => timestamp_code(&local),
        };
        Self {
            branch,
            number,
            time,
        }
    }

    /// Build info for the repository containing `dir`.
    ///
    /// A failed branch lookup is logged and yields the bare timestamp code.
    pub fn detect(dir: &Path, time: DateTime<Local>) -> Self {
        let branch = match current_branch(dir) {
            Ok(branch) => Some(branch),
            Err(e) => {
                warn!("cannot determine branch ({}); build number is a bare timestamp", e);
                None
            }
        };
        Self::new(branch, time)
    }
}
