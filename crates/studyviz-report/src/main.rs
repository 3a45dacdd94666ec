//! studyviz - render study metadata charts from a spreadsheet

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use studyviz_common::init_logging;
use studyviz_config::ConfigLoader;
use studyviz_report::{ReportError, ReportGenerator, ReportSummary};
use tracing::{error, info, warn};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input spreadsheet or CSV file, overriding the configured path
    #[arg(short, long)]
    input: Option<String>,

    /// Directory the charts are written to
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_parser = LOG_LEVELS)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::load(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.input.path = input;
    }
    if let Some(dir) = args.output_dir {
        config.output.directory = dir;
    }

    let mut logging = config.logging.to_logging_config();
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    init_logging(logging)?;

    info!(input = %config.input.path, "Starting studyviz");

    finish(ReportGenerator::new(config).run())
}

/// Map the report outcome to the process exit status.
///
/// A load failure has already been reported on stdout and ends the run
/// normally; any later fault exits non-zero.
fn finish(outcome: std::result::Result<ReportSummary, ReportError>) -> Result<()> {
    match outcome {
        Ok(summary) => {
            info!(
                rows = summary.rows,
                files = summary.files.len(),
                "Charts written"
            );
            Ok(())
        }
        Err(e) if e.is_load_failure() => {
            warn!("No charts rendered: {e}");
            Ok(())
        }
        Err(e) => {
            error!("Report failed: {e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyviz_common::StudyVizError;
    use studyviz_graphs::ChartKind;

    #[test]
    fn test_log_level_accepts_known_levels() {
        for level in LOG_LEVELS {
            let args = Args::try_parse_from(["studyviz", "--log-level", level]).unwrap();
            assert_eq!(args.log_level.as_deref(), Some(level));
        }
    }

    #[test]
    fn test_log_level_rejects_unknown_level() {
        assert!(Args::try_parse_from(["studyviz", "--log-level", "loud"]).is_err());
        assert!(Args::try_parse_from(["studyviz", "-l", "INFO"]).is_err());
    }

    #[test]
    fn test_load_failure_exits_cleanly() {
        let err = ReportError::Load(StudyVizError::data_load("missing.xlsx", "failed to open workbook"));
        assert!(finish(Err(err)).is_ok());
    }

    #[test]
    fn test_chart_failure_exits_with_error() {
        let err = ReportError::Chart {
            chart: ChartKind::StudyTypes,
            source: StudyVizError::graph("No data available for study types chart"),
        };
        assert!(finish(Err(err)).is_err());
    }

    #[test]
    fn test_success_exits_cleanly() {
        let summary = ReportSummary {
            rows: 3,
            ..ReportSummary::default()
        };
        assert!(finish(Ok(summary)).is_ok());
    }
}
