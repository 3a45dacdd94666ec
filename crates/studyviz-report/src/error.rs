//! Report generation errors

use std::path::PathBuf;
use studyviz_common::StudyVizError;
use studyviz_graphs::ChartKind;
use thiserror::Error;

/// Errors that end a report run
#[derive(Debug, Error)]
pub enum ReportError {
    /// The input table could not be loaded; nothing was rendered
    #[error("Error loading data: {0}")]
    Load(#[source] StudyVizError),

    /// The output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A chart failed to compute or render
    #[error("Failed to render {chart:?} chart: {source}")]
    Chart {
        chart: ChartKind,
        #[source]
        source: StudyVizError,
    },

    /// Writing the progress report failed
    #[error("Failed to write report output: {0}")]
    Output(#[from] std::io::Error),
}

impl ReportError {
    pub fn is_load_failure(&self) -> bool {
        matches!(self, ReportError::Load(_))
    }
}
