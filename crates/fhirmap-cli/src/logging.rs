//! Logging setup for the `fhirmap` binary using `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: command failures
//! - `warn`: skipped coercions, failed field mappings, lenient registration problems
//! - `info`: configuration registration and repository writes
//! - `debug`: per-field analysis and mapping decisions
//! - `trace`: unused
//!
//! Source record values are patient data. Library crates log them through
//! [`fhirmap_model::redact_value`], which only passes values through after
//! [`init_logging`] ran with `log_data` enabled.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fhirmap_model::set_log_data_enabled;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use fhirmap_model::{REDACTED_VALUE, log_data_enabled, redact_value};

/// Crates whose events the default filter admits at the configured level.
const CRATES: &[&str] = &[
    "fhirmap",
    "fhirmap_cli",
    "fhirmap_map",
    "fhirmap_model",
    "fhirmap_standards",
    "fhirmap_transform",
    "fhirmap_validate",
];

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter`.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    /// Include the module path of each event.
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Write to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Whether source record values may be logged.
    pub log_data: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    #[must_use]
    pub fn with_log_data(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }

    /// Filter directives admitting the workspace crates at the configured level.
    pub fn directives(&self) -> String {
        let level = self.level_filter.to_string().to_lowercase();
        let mut directives = vec![LevelFilter::WARN.to_string().to_lowercase()];
        directives.extend(CRATES.iter().map(|name| format!("{name}={level}")));
        directives.join(",")
    }
}

/// Installs the global subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, SharedFileWriter::new(file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

/// Installs the global subscriber writing to `writer`.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    set_log_data_enabled(config.log_data);
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.with_target);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);
            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);
            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(config.directives())
}
