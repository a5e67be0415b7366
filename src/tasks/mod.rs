//! Task runners for the delegated tools
//!
//! Each tool sits behind a trait so the orchestrator can be driven by
//! recording mocks in tests:
//! - [`ImageOptimizer`] (imagemin)
//! - [`StyleCompiler`] (dart-sass)
//! - [`Bundler`] (webpack)

pub mod imagemin;
pub mod process;
pub mod sass;
pub mod webpack;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ToolSettings;
use crate::options::BuildMode;

pub use imagemin::{ImageOptimizer, ImageminCli};
pub use process::{ToolCommand, ToolError, ToolOutput};
pub use sass::{StyleCompiler, SassCli};
pub use webpack::{BundleStats, Bundler, WebpackCli};

/// Failure inside one task
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{mode} build reported {count} error(s); first: {first}")]
    Compilation {
        mode: BuildMode,
        count: usize,
        first: String,
    },

    #[error("invalid task configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Failed(String),
}

/// The three external tools
pub struct Toolset {
    pub images: Box<dyn ImageOptimizer>,
    pub styles: Box<dyn StyleCompiler>,
    pub bundler: Box<dyn Bundler>,
}

impl Toolset {
    pub fn new(
        images: Box<dyn ImageOptimizer>,
        styles: Box<dyn StyleCompiler>,
        bundler: Box<dyn Bundler>,
    ) -> Self {
        Self {
            images,
            styles,
            bundler,
        }
    }

    /// Real command-line tools launched from `root`
    pub fn external(settings: &ToolSettings, root: &Path) -> Result<Self, ToolError> {
        let imagemin = ToolCommand::new("imagemin", &settings.imagemin)?;
        let sass = ToolCommand::new("sass", &settings.sass)?;
        let webpack = ToolCommand::new("webpack", &settings.webpack)?;

        Ok(Self::new(
            Box::new(ImageminCli::new(imagemin, root)),
            Box::new(SassCli::new(sass, root)),
            Box::new(WebpackCli::new(webpack, root, &settings.scratch_dir)),
        ))
    }
}
