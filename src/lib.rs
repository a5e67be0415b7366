//! asset-builder - front-end build orchestration
//!
//! This crate drives the delegated front-end tools of a web project:
//! image optimization, Sass compilation and webpack bundling. Bundler
//! configs are composed from a named preset and the host project's own
//! config, stamped with build metadata, and handed to webpack once per
//! build mode.

pub mod build_number;
pub mod compose;
pub mod config;
pub mod files;
pub mod mock;
pub mod options;
pub mod orchestrator;
pub mod summary;
pub mod tasks;

pub use build_number::{BuildInfo, BuildNumberError};
pub use config::{ConfigError, HostConfig, LoadedHostConfig, StrategyMerge, ToolSettings};
pub use options::{BuildMode, BuildOptions, Mode, Module, OutputLevel};
pub use orchestrator::{BuildError, BuildResult, Orchestrator};
pub use summary::{RunReport, TaskReport, TaskStatus};
pub use tasks::{TaskError, Toolset};
