//! Configuration: host config loading, tool defaults and merging
//!
//! Two kinds of layering happen here:
//! 1. Tool launch settings: built-in defaults, then the host `tools` section
//! 2. Bundler configs: preset and host fragments, see [`StrategyMerge`]

mod defaults;
mod host;
mod merge;

pub use defaults::ToolSettings;
pub use host::{ConfigError, ConfigSource, CustomConfig, CustomPlugin, HostConfig, LoadedHostConfig};
pub use merge::{deep_merge, MergeStrategy, StrategyMerge, StrategyTable};
