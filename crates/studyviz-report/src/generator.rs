//! Report pipeline: load the table once, then render each enabled chart in turn

use crate::ReportError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use studyviz_common::{Dataset, DatasetLoader};
use studyviz_config::{ChartOutputConfig, Config, PaletteName};
use studyviz_graphs::{
    ChartConfig, ChartRenderer, ColorScheme, FontConfig, GridConfig, PsychedelicTimelineChart,
    StudyTypesChart, SystemImprovementsChart,
};
use tracing::{debug, info, warn};

/// Message printed once every enabled chart has been written
pub const COMPLETION_MESSAGE: &str = "Visualizations have been created and saved as PNG files.";

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    /// Column headers of the loaded table
    pub columns: Vec<String>,
    /// Number of data rows loaded
    pub rows: usize,
    /// Chart files written, in rendering order
    pub files: Vec<PathBuf>,
}

/// Build the chart style from the configured style section
pub fn chart_style(style: &studyviz_config::StyleConfig) -> studyviz_graphs::StyleConfig {
    let color_scheme = match style.palette {
        PaletteName::Vintage => ColorScheme::Vintage,
        PaletteName::Muted => ColorScheme::Muted,
        PaletteName::Custom => ColorScheme::Custom(style.custom_colors.clone()),
    };

    studyviz_graphs::StyleConfig {
        color_scheme,
        background_color: Some(style.background_color.clone()),
        axis_color: style.axis_color.clone(),
        dpi: style.dpi,
        title_font: FontConfig::new(&style.font_family, style.title_font_size, true),
        label_font: FontConfig::new(&style.font_family, style.label_font_size, true),
        tick_font: FontConfig::new(&style.font_family, style.tick_font_size, false),
        grid: GridConfig {
            show: style.show_grid,
            color: style.grid_color.clone(),
            ..GridConfig::default()
        },
        show_legend: style.show_legend,
        ..studyviz_graphs::StyleConfig::default()
    }
}

/// Renders the configured charts from the configured input table
pub struct ReportGenerator {
    config: Config,
}

impl ReportGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the report, printing progress to standard output
    pub fn run(&self) -> Result<ReportSummary, ReportError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }

    /// Run the report, printing progress to `out`.
    ///
    /// A load failure is reported and returned before anything touches the
    /// output directory.
    pub fn run_with_output<W: Write>(&self, out: &mut W) -> Result<ReportSummary, ReportError> {
        let dataset = match self.load_dataset() {
            Ok(dataset) => dataset,
            Err(err) => {
                writeln!(out, "{err}")?;
                return Err(err);
            }
        };

        writeln!(out, "Available columns in the input file:")?;
        writeln!(out, "{:?}", dataset.columns())?;

        let output_dir = PathBuf::from(&self.config.output.directory);
        fs::create_dir_all(&output_dir).map_err(|source| ReportError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

        let style = chart_style(&self.config.style);
        let charts = &self.config.charts;
        let mut files = Vec::new();

        if charts.study_types.enabled {
            let (mut chart, config) = StudyTypesChart::with_config(style.clone());
            files.push(self.render(&mut chart, &config, &dataset, &output_dir, &charts.study_types)?);
        } else {
            debug!("Study types chart disabled");
        }

        if charts.psychedelic_timeline.enabled {
            let (mut chart, config) = PsychedelicTimelineChart::with_config(style.clone());
            files.push(self.render(
                &mut chart,
                &config,
                &dataset,
                &output_dir,
                &charts.psychedelic_timeline,
            )?);
        } else {
            debug!("Psychedelic timeline chart disabled");
        }

        if charts.system_improvements.enabled {
            let (mut chart, config) = SystemImprovementsChart::with_config(
                style.clone(),
                self.config.reference.systems.clone(),
            );
            files.push(self.render(
                &mut chart,
                &config,
                &dataset,
                &output_dir,
                &charts.system_improvements,
            )?);
        } else {
            debug!("System improvements chart disabled");
        }

        if files.is_empty() {
            warn!("Every chart is disabled, no files were written");
        }

        writeln!(out, "{COMPLETION_MESSAGE}")?;
        info!(charts = files.len(), output = %output_dir.display(), "Report complete");

        Ok(ReportSummary {
            columns: dataset.columns().to_vec(),
            rows: dataset.len(),
            files,
        })
    }

    fn load_dataset(&self) -> Result<Dataset, ReportError> {
        let loader = DatasetLoader::new(&self.config.input.path)
            .with_sheet(self.config.input.sheet.clone());
        info!(path = %loader.path().display(), "Loading study metadata");
        loader.load().map_err(ReportError::Load)
    }

    fn render<C: ChartRenderer>(
        &self,
        chart: &mut C,
        config: &ChartConfig,
        dataset: &Dataset,
        output_dir: &Path,
        output: &ChartOutputConfig,
    ) -> Result<PathBuf, ReportError> {
        let path = output_dir.join(&output.file_name);
        debug!(chart = chart.name(), path = %path.display(), "Rendering chart");

        chart
            .prepare(dataset)
            .and_then(|()| chart.render_to_file(config, &path))
            .map_err(|source| ReportError::Chart {
                chart: config.kind,
                source,
            })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyviz_graphs::ChartKind;

    #[test]
    fn test_chart_style_from_defaults() {
        let style = chart_style(&studyviz_config::StyleConfig::default());
        assert_eq!(style.color_scheme, ColorScheme::Vintage);
        assert_eq!(style.dpi, 300);
        assert_eq!(style.background_color.as_deref(), Some("#FFFFFF"));
        assert_eq!(style.title_font.size, 16);
        assert!(style.title_font.bold);
        assert!(style.label_font.bold);
        assert!(!style.tick_font.bold);
        assert!(style.grid.show);
    }

    #[test]
    fn test_chart_style_custom_palette() {
        let config = studyviz_config::StyleConfig {
            palette: PaletteName::Custom,
            custom_colors: vec!["#112233".to_string()],
            font_family: "serif".to_string(),
            show_grid: false,
            ..studyviz_config::StyleConfig::default()
        };
        let style = chart_style(&config);

        assert_eq!(style.color_scheme, ColorScheme::Custom(vec!["#112233".to_string()]));
        assert_eq!(style.tick_font.family, "serif");
        assert!(!style.grid.show);
    }

    #[test]
    fn test_muted_palette() {
        let config = studyviz_config::StyleConfig {
            palette: PaletteName::Muted,
            ..studyviz_config::StyleConfig::default()
        };
        assert_eq!(chart_style(&config).color_scheme, ColorScheme::Muted);
    }

    #[test]
    fn test_default_file_names_match_chart_kinds() {
        let charts = Config::default().charts;
        assert_eq!(charts.study_types.file_name, ChartKind::StudyTypes.default_file_name());
        assert_eq!(
            charts.psychedelic_timeline.file_name,
            ChartKind::PsychedelicTimeline.default_file_name()
        );
        assert_eq!(
            charts.system_improvements.file_name,
            ChartKind::SystemImprovements.default_file_name()
        );
    }
}
