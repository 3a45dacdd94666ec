//! Study metadata report: loads the input table and writes the PNG charts

pub mod error;
pub mod generator;

pub use error::ReportError;
pub use generator::{chart_style, ReportGenerator, ReportSummary, COMPLETION_MESSAGE};
