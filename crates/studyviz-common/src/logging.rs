//! Structured logging infrastructure for studyviz
//!
//! Diagnostics go to stderr (or a log file); stdout is reserved for the
//! report's own messages.

use crate::{Result, StudyVizError};
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "studyviz_graphs=trace")
    pub level: String,
    /// Optional file path for log output
    pub file_path: Option<String>,
    /// Whether to enable ANSI colours on the console
    pub colored: bool,
    /// Whether to include spans in the output
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            colored: true,
            include_spans: false,
            include_targets: true,
        }
    }
}

impl LoggingConfig {
    /// Build the env filter, falling back to `info` for an unparseable directive
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Initialize the tracing subscriber with the given configuration
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let layer = fmt::layer()
        .with_span_events(config.span_events())
        .with_target(config.include_targets);

    let result = if let Some(file_path) = &config.file_path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        registry
            .with(layer.with_ansi(false).with_writer(Mutex::new(file)))
            .try_init()
    } else {
        registry
            .with(layer.with_ansi(config.colored).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| StudyVizError::with_source("Failed to initialize logging", e))
}
