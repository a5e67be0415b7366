//! Invocation options: module, mode and output level selection
//!
//! A [`BuildOptions`] value is built once from the command line and never
//! changes afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use clap::ValueEnum;

/// A delegated build step, or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Module {
    /// Image optimization and Sass concurrently, then webpack
    All,
    Imagemin,
    Sass,
    Webpack,
}

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::All => "all",
            Module::Imagemin => "imagemin",
            Module::Sass => "sass",
            Module::Webpack => "webpack",
        }
    }

    /// Capitalized name used in task failure messages
    pub fn label(&self) -> &'static str {
        match self {
            Module::All => "Build",
            Module::Imagemin => "Imagemin",
            Module::Sass => "Sass",
            Module::Webpack => "Webpack",
        }
    }

    /// Concrete modules this selection runs, webpack always last
    pub fn expand(&self) -> Vec<Module> {
        match self {
            Module::All => vec![Module::Imagemin, Module::Sass, Module::Webpack],
            other => vec![*other],
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested build variant(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Mode {
    /// Every concrete mode
    All,
    Production,
    Development,
    /// Production build with the bundle analyzer attached
    CodeAnalysis,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::All => "all",
            Mode::Production => "production",
            Mode::Development => "development",
            Mode::CodeAnalysis => "code-analysis",
        }
    }

    /// Concrete modes in execution order.
    ///
    /// Development always precedes production so the production file
    /// naming scheme is what remains on disk.
    pub fn expand(&self) -> Vec<BuildMode> {
        match self {
            Mode::All => vec![
                BuildMode::CodeAnalysis,
                BuildMode::Development,
                BuildMode::Production,
            ],
            Mode::Production => vec![BuildMode::Production],
            Mode::Development => vec![BuildMode::Development],
            Mode::CodeAnalysis => vec![BuildMode::CodeAnalysis],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single bundler run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    CodeAnalysis,
    Development,
    Production,
}

/// Which fragment set of a preset or host config a build mode reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Production,
    Development,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::CodeAnalysis => "code-analysis",
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            BuildMode::Development => Variant::Development,
            BuildMode::CodeAnalysis | BuildMode::Production => Variant::Production,
        }
    }

    /// Code-analysis builds always carry the analyzer fragment
    pub fn forces_analysis(&self) -> bool {
        matches!(self, BuildMode::CodeAnalysis)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Console verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputLevel {
    Min,
    #[default]
    Normal,
    Verbose,
}

impl OutputLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputLevel::Min => "min",
            OutputLevel::Normal => "normal",
            OutputLevel::Verbose => "verbose",
        }
    }

    /// Log filter used when RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            OutputLevel::Min => "warn",
            OutputLevel::Normal => "info",
            OutputLevel::Verbose => "debug",
        }
    }

    /// webpack `stats` preset
    pub fn stats_preset(&self) -> &'static str {
        match self {
            OutputLevel::Min => "errors-warnings",
            OutputLevel::Normal => "normal",
            OutputLevel::Verbose => "verbose",
        }
    }
}

impl fmt::Display for OutputLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default directory of the host config, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "build";

/// Default host config file name
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Options for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub module: Module,
    pub mode: Mode,
    pub preset: String,

    /// Directory holding the host config, relative to the working directory
    pub config_dir: PathBuf,

    /// Host config file name
    pub external_config: String,

    /// Build time as epoch milliseconds
    pub build_timestamp_ms: i64,

    /// Attach the bundle analyzer to every bundler run
    pub code_analysis: bool,

    pub output_level: OutputLevel,
}

impl BuildOptions {
    /// Options with default config location, current time and normal output
    pub fn new(module: Module, mode: Mode, preset: impl Into<String>) -> Self {
        Self {
            module,
            mode,
            preset: preset.into(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            external_config: DEFAULT_CONFIG_FILE.to_string(),
            build_timestamp_ms: Local::now().timestamp_millis(),
            code_analysis: false,
            output_level: OutputLevel::Normal,
        }
    }

    pub fn with_code_analysis(mut self, enabled: bool) -> Self {
        self.code_analysis = enabled;
        self
    }

    pub fn with_build_timestamp(mut self, epoch_ms: i64) -> Self {
        self.build_timestamp_ms = epoch_ms;
        self
    }

    pub fn with_output_level(mut self, level: OutputLevel) -> Self {
        self.output_level = level;
        self
    }

    /// `<root>/<config_dir>/<external_config>`
    pub fn external_config_path(&self, root: &Path) -> PathBuf {
        root.join(&self.config_dir).join(&self.external_config)
    }

    /// Build time in local time, `None` if the timestamp is out of range
    pub fn build_time(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.build_timestamp_ms).single()
    }
}
