//! Routine file operations on vendored dependencies
//!
//! Every operation works on the top level of a directory only. An empty
//! file list means every regular file in the directory.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File operation errors
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("cannot list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which operation ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Clean,
    Copy,
    Replace,
}

/// Outcome of one operation
#[derive(Debug, Clone, PartialEq)]
pub struct FileOpReport {
    pub operation: FileOperation,
    pub dir: PathBuf,
    pub count: usize,

    /// Files that could not be copied, with the reason
    pub skipped: Vec<(String, String)>,
}

impl FileOpReport {
    fn new(operation: FileOperation, dir: &Path) -> Self {
        Self {
            operation,
            dir: dir.to_path_buf(),
            count: 0,
            skipped: Vec::new(),
        }
    }

    pub fn summary(&self) -> String {
        let dir = self.dir.display();
        match self.operation {
            FileOperation::Clean => format!("Removed {} files from {}", self.count, dir),
            FileOperation::Copy => format!("Copied {} files into {}", self.count, dir),
            FileOperation::Replace => format!("Updated {} file(s) within {}", self.count, dir),
        }
    }
}

/// Names of the regular files directly inside `dir`, sorted
pub fn list_files(dir: &Path) -> Result<Vec<String>, FileOpError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| FileOpError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(names)
}

fn selected(dir: &Path, files: &[String]) -> Result<Vec<String>, FileOpError> {
    if files.is_empty() {
        list_files(dir)
    } else {
        Ok(files.to_vec())
    }
}

/// Remove `files` (or every file) from `target`
pub fn clean(target: &Path, files: &[String]) -> Result<FileOpReport, FileOpError> {
    let mut report = FileOpReport::new(FileOperation::Clean, target);
    for name in selected(target, files)? {
        let path = target.join(&name);
        fs::remove_file(&path).map_err(|e| FileOpError::Remove {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "removed");
        report.count += 1;
    }
    Ok(report)
}

/// Copy `files` (or every file) from `source` into `target`.
///
/// Without `overwrite` an existing target file is left alone and reported
/// in [`FileOpReport::skipped`].
pub fn copy(
    source: &Path,
    target: &Path,
    files: &[String],
    overwrite: bool,
) -> Result<FileOpReport, FileOpError> {
    let operation = if overwrite {
        FileOperation::Replace
    } else {
        FileOperation::Copy
    };
    let mut report = FileOpReport::new(operation, target);

    for name in selected(source, files)? {
        let from = source.join(&name);
        let to = target.join(&name);
        match copy_file(&from, &to, overwrite) {
            Ok(()) => {
                debug!(from = %from.display(), to = %to.display(), "copied");
                report.count += 1;
            }
            Err(e) => {
                warn!(
                    "Cannot copy {} into {}. File already exists? ({})",
                    name,
                    target.display(),
                    e
                );
                report.skipped.push((name, e.to_string()));
            }
        }
    }
    Ok(report)
}

fn copy_file(from: &Path, to: &Path, overwrite: bool) -> io::Result<()> {
    if overwrite {
        fs::copy(from, to)?;
        return Ok(());
    }
    let mut reader = File::open(from)?;
    let mut writer = OpenOptions::new().write(true).create_new(true).open(to)?;
    io::copy(&mut reader, &mut writer)?;
    Ok(())
}
