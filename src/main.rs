//! asset-build CLI
//!
//! Entry point for the `asset-build` command-line tool.

use std::env;
use std::path::PathBuf;
use std::process;

use asset_builder::config::ConfigError;
use asset_builder::{
    BuildError, BuildInfo, BuildOptions, BuildResult, HostConfig, Mode, Module, Orchestrator,
    OutputLevel, RunReport, Toolset,
};
use asset_presets::{PresetRegistry, PRESET_NAMES};
use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asset-build")]
#[command(about = "Front-end build orchestration: imagemin, sass and webpack", version)]
#[command(after_help = "A module runs only when the host config has its section \
(imagemin, sass, webpack); otherwise it is skipped.\n\
To bundle with the preset alone, declare an empty section: \"webpack\": {}")]
struct Cli {
    /// Module to run
    #[arg(long, value_enum)]
    module: Module,

    /// Bundler mode(s) to build
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Base bundler configuration
    #[arg(long, value_parser = PossibleValuesParser::new(PRESET_NAMES.iter().copied()))]
    preset: String,

    /// Host config file name
    #[arg(long = "externalConfig", default_value = asset_builder::options::DEFAULT_CONFIG_FILE)]
    external_config: String,

    /// Directory of the host config, relative to the working directory
    #[arg(long = "configPath", default_value = asset_builder::options::DEFAULT_CONFIG_DIR)]
    config_path: PathBuf,

    /// Build time as epoch milliseconds (default: now)
    #[arg(long = "buildTime")]
    build_time: Option<i64>,

    /// Attach the bundle analyzer to every bundler run
    #[arg(
        long = "codeAnalysis",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    code_analysis: bool,

    /// Console verbosity
    #[arg(long = "outputLevel", value_enum, default_value_t = OutputLevel::Normal)]
    output_level: OutputLevel,
}

impl Cli {
    fn into_options(self) -> BuildOptions {
        let mut options = BuildOptions::new(self.module, self.mode, self.preset)
            .with_code_analysis(self.code_analysis)
            .with_output_level(self.output_level);
        if let Some(ms) = self.build_time {
            options = options.with_build_timestamp(ms);
        }
        options.config_dir = self.config_path;
        options.external_config = self.external_config;
        options
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_tracing(cli.output_level);

    match run(cli.into_options()) {
        Ok(report) => println!("{}", report.to_human()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing(level: OutputLevel) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.default_log_filter())),
        )
        .init();
}

fn run(options: BuildOptions) -> BuildResult<RunReport> {
    let root = env::current_dir().map_err(|e| {
        ConfigError::IoError(format!("cannot resolve working directory: {}", e))
    })?;

    let config_path = options.external_config_path(&root);
    info!(
        module = %options.module,
        mode = %options.mode,
        preset = %options.preset,
        config = %config_path.display(),
        output_level = %options.output_level,
        code_analysis = options.code_analysis,
        "asset-build starting"
    );

    let loaded = HostConfig::load(&config_path)?;
    info!(digest = %loaded.source.digest, "loaded host config from {}", loaded.source.path);
    let settings = loaded.config.tool_settings()?;

    let time = options.build_time().ok_or_else(|| {
        BuildError::Usage(format!(
            "--buildTime {} is out of range",
            options.build_timestamp_ms
        ))
    })?;
    let build = BuildInfo::detect(&root, time);

    let registry = PresetRegistry::standard();
    let tools = Toolset::external(&settings, &root)?;
    let orchestrator = Orchestrator::new(options, &registry, loaded.config, build, tools, &root)?;
    orchestrator.run()
}
