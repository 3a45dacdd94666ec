//! Error types and utilities for studyviz

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for studyviz operations
pub type Result<T> = std::result::Result<T, StudyVizError>;

/// Main error type for studyviz operations
#[derive(Error, Debug)]
pub enum StudyVizError {
    /// The input table could not be loaded (missing, unreadable or malformed).
    /// The underlying cause is part of the message.
    #[error(
        "Failed to load data from {}: {message}{}",
        path.display(),
        .source.as_ref().map(|e| format!(": {e}")).unwrap_or_default()
    )]
    DataLoad {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A chart referenced a column the table does not have
    #[error("Column '{column}' not found (available columns: {})", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A cell could not be interpreted as the type its column requires
    #[error("Invalid value in column '{column}' at row {row}: {message}")]
    InvalidValue {
        column: String,
        row: usize,
        message: String,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Graph generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StudyVizError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new data load error
    pub fn data_load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new data load error with source
    pub fn data_load_with_source(
        path: impl Into<PathBuf>,
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new missing column error
    pub fn missing_column(column: impl Into<String>, available: &[String]) -> Self {
        Self::MissingColumn {
            column: column.into(),
            available: available.to_vec(),
        }
    }

    /// Create a new invalid value error
    pub fn invalid_value(column: impl Into<String>, row: usize, msg: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.into(),
            row,
            message: msg.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error happened while loading the input table
    pub fn is_data_load(&self) -> bool {
        matches!(self, Self::DataLoad { .. })
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to StudyVizError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for StudyVizError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}
