//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fhirmap",
    version,
    about = "Discover and apply mappings from legacy records to FHIR resources",
    long_about = "Discover and apply mappings from legacy records to FHIR resources.\n\n\
                  Records are JSON objects (or arrays of objects) keyed by source field name.\n\
                  Configurations are the JSON documents written by `fhirmap generate`."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow source record values in log output.
    ///
    /// Records usually carry patient data; values are redacted unless this is set.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

/// Options shared by every command that analyzes or maps records.
#[derive(Args, Clone)]
pub struct EngineArgs {
    /// Reject configurations with unsupported target paths or duplicate source fields.
    #[arg(long = "strict-paths", global = true)]
    pub strict_paths: bool,

    /// Confidence given to fields no pattern recognizes.
    #[arg(long = "unknown-confidence", value_name = "SCORE", global = true)]
    pub unknown_confidence: Option<f64>,

    /// Unrecognized fields below this confidence are left out of generated configurations.
    #[arg(long = "noise-cutoff", value_name = "SCORE", global = true)]
    pub noise_cutoff: Option<f64>,

    /// Directory of stored configurations (one `<ResourceType>.json` per type).
    #[arg(long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Propose FHIR targets for the fields of a sample record.
    Analyze(AnalyzeArgs),

    /// Generate a mapping configuration from a sample record.
    Generate(GenerateArgs),

    /// Build a mapping configuration from reviewed `analyze --json` output.
    Configure(ConfigureArgs),

    /// Store a configuration file in the configuration directory.
    Save(ConfigArgs),

    /// Map records to FHIR resources.
    Apply(ApplyArgs),

    /// Apply a configuration to a record and validate the result.
    Preview(PreviewArgs),

    /// Check a FHIR resource for required elements.
    Validate(ValidateArgs),

    /// List target paths a configuration leaves unmapped.
    Suggest(ConfigArgs),

    /// Generate Rust mapper source from a configuration.
    Mapper(MapperArgs),

    /// List the field-name pattern catalog.
    Patterns(PatternsArgs),

    /// List configurations stored in the configuration directory.
    Configs,
}

#[derive(Args)]
pub struct RecordArgs {
    /// JSON file holding a record object or an array of records (`-` for stdin).
    #[arg(value_name = "RECORDS")]
    pub input: PathBuf,

    /// Target FHIR resource type.
    #[arg(long = "resource-type", short = 'r', default_value = "Patient")]
    pub resource_type: String,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Print analysis as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Profile URL stamped into `meta.profile` of mapped resources.
    #[arg(long = "profile", value_name = "URL")]
    pub profile: Option<String>,

    /// Write the configuration to this file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also store the configuration in the configuration directory.
    #[arg(long = "save")]
    pub save: bool,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Analysis document or JSON array of candidate mappings (`-` for stdin).
    #[arg(value_name = "ANALYSIS")]
    pub input: PathBuf,

    /// Target FHIR resource type (defaults to the one the analysis names).
    #[arg(long = "resource-type", short = 'r')]
    pub resource_type: Option<String>,

    /// Profile URL stamped into `meta.profile` of mapped resources.
    #[arg(long = "profile", value_name = "URL")]
    pub profile: Option<String>,

    /// Write the configuration to this file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also store the configuration in the configuration directory.
    #[arg(long = "save")]
    pub save: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Configuration file to map with.
    ///
    /// Without it the stored configuration for the resource type is used,
    /// or one is generated from the first record.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the resources to this file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// JSON file holding one record object (`-` for stdin).
    #[arg(value_name = "RECORD")]
    pub input: PathBuf,

    /// Configuration file to preview.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: PathBuf,

    /// Print the preview as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// FHIR resource JSON file (`-` for stdin).
    #[arg(value_name = "RESOURCE")]
    pub input: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Mapping configuration file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct MapperArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write the source to this file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PatternsArgs {
    /// Only list rules for this resource type.
    #[arg(long = "resource-type", short = 'r')]
    pub resource_type: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
