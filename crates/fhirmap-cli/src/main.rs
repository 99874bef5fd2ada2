//! `fhirmap`: discover and apply legacy-to-FHIR mappings.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use fhirmap_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    build_service, run_analyze, run_apply, run_configs, run_configure, run_generate, run_mapper,
    run_patterns, run_preview, run_save, run_suggest, run_validate,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = build_service(&cli.engine).and_then(|service| match &cli.command {
        Command::Analyze(args) => run_analyze(&service, args),
        Command::Generate(args) => run_generate(&service, args),
        Command::Configure(args) => run_configure(&service, args),
        Command::Save(args) => run_save(&service, args),
        Command::Apply(args) => run_apply(&service, args),
        Command::Preview(args) => run_preview(&service, args),
        Command::Validate(args) => run_validate(&service, args),
        Command::Suggest(args) => run_suggest(&service, args),
        Command::Mapper(args) => run_mapper(&service, args),
        Command::Patterns(args) => run_patterns(args),
        Command::Configs => run_configs(&service),
    });
    let exit_code = match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(error) => {
            eprintln!("error: {error:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level_filter(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
