//! Application configuration structures

use serde::{Deserialize, Serialize};
use studyviz_common::{default_system_improvements, SystemImprovement};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Input table location
    pub input: InputConfig,

    /// Where chart images are written
    pub output: OutputConfig,

    /// Per-chart switches and file names
    pub charts: ChartsConfig,

    /// Chart rendering style
    pub style: StyleConfig,

    /// Reference data for the system-improvement chart
    pub reference: ReferenceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Input table configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InputConfig {
    /// Spreadsheet or CSV file, relative to the working directory
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Input path must be a valid file path"))]
    pub path: String,

    /// Sheet to read; the first sheet when unset
    pub sheet: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the PNG files are written to, created when missing
    #[validate(length(min = 1, message = "Output directory cannot be empty"))]
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Output directory must be a valid path"))]
    pub directory: String,
}

/// Settings of the three charts
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartsConfig {
    pub study_types: ChartOutputConfig,
    pub psychedelic_timeline: ChartOutputConfig,
    pub system_improvements: ChartOutputConfig,
}

/// Whether a chart is produced and under which file name
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChartOutputConfig {
    /// Whether the chart is rendered at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// PNG file name inside the output directory
    #[validate(custom(function = "crate::validation::validate_png_file_name", message = "Chart file name must be a bare .png file name"))]
    pub file_name: String,
}

/// Named color palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    Vintage,
    Muted,
    Custom,
}

/// Chart style configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StyleConfig {
    /// Output resolution; figure sizes are in inches
    #[validate(range(min = 36, max = 1200, message = "DPI must be between 36 and 1200"))]
    pub dpi: u32,

    /// Background color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be valid hex color"))]
    pub background_color: String,

    /// Axis frame and text color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Axis color must be valid hex color"))]
    pub axis_color: String,

    /// Grid and reference line color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Grid color must be valid hex color"))]
    pub grid_color: String,

    /// Bar and marker palette
    pub palette: PaletteName,

    /// Colors used when `palette` is `custom`
    #[validate(custom(function = "crate::validation::validate_hex_colors", message = "Custom colors must be valid hex colors"))]
    pub custom_colors: Vec<String>,

    /// Font family for all text
    #[validate(length(min = 1, message = "Font family cannot be empty"))]
    pub font_family: String,

    /// Title font size in points
    #[validate(range(min = 6, max = 72, message = "Font size must be between 6 and 72"))]
    pub title_font_size: u32,

    /// Axis description font size in points
    #[validate(range(min = 6, max = 72, message = "Font size must be between 6 and 72"))]
    pub label_font_size: u32,

    /// Tick label and annotation font size in points
    #[validate(range(min = 6, max = 72, message = "Font size must be between 6 and 72"))]
    pub tick_font_size: u32,

    /// Whether to draw grid lines
    pub show_grid: bool,

    /// Whether to draw legends
    pub show_legend: bool,
}

/// Reference data configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Improvement by physiological system
    #[validate(custom(function = "crate::validation::validate_reference_table", message = "Reference table must be non-empty with percentages in 0-100 and positive sample sizes"))]
    pub systems: Vec<SystemImprovement>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,

    /// Whether to use colored output (for console logging)
    pub colored: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate every section, then the cross-field rules
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.input.validate()?;
        self.output.validate()?;
        self.charts.validate_charts()?;
        self.style.validate()?;
        self.style.validate_palette()?;
        self.reference.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl ChartsConfig {
    /// Validate each chart entry and require distinct file names
    pub fn validate_charts(&self) -> Result<(), validator::ValidationErrors> {
        self.study_types.validate()?;
        self.psychedelic_timeline.validate()?;
        self.system_improvements.validate()?;

        let names = [
            &self.study_types.file_name,
            &self.psychedelic_timeline.file_name,
            &self.system_improvements.file_name,
        ];
        let duplicate = names
            .iter()
            .enumerate()
            .any(|(i, a)| names[i + 1..].iter().any(|b| a.eq_ignore_ascii_case(b)));

        if duplicate {
            let mut errors = validator::ValidationErrors::new();
            errors.add("file_name", validator::ValidationError::new("duplicate_file_name"));
            return Err(errors);
        }
        Ok(())
    }
}

impl StyleConfig {
    /// A custom palette needs at least one color
    pub fn validate_palette(&self) -> Result<(), validator::ValidationErrors> {
        if self.palette == PaletteName::Custom && self.custom_colors.is_empty() {
            let mut errors = validator::ValidationErrors::new();
            errors.add(
                "custom_colors",
                validator::ValidationError::new("empty_custom_palette"),
            );
            return Err(errors);
        }
        Ok(())
    }
}

impl LoggingConfig {
    /// Runtime logging setup for this configuration
    pub fn to_logging_config(&self) -> studyviz_common::LoggingConfig {
        studyviz_common::LoggingConfig {
            level: self.level.clone(),
            file_path: self.file.clone(),
            colored: self.colored,
            ..studyviz_common::LoggingConfig::default()
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "Key_results_output_1.2.xlsx".to_string(),
            sheet: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}

impl ChartOutputConfig {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            file_name: file_name.into(),
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            study_types: ChartOutputConfig::new("study_types.png"),
            psychedelic_timeline: ChartOutputConfig::new("psychedelic_timeline.png"),
            system_improvements: ChartOutputConfig::new("system_improvements.png"),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            background_color: "#FFFFFF".to_string(),
            axis_color: "#000000".to_string(),
            grid_color: "#808080".to_string(),
            palette: PaletteName::Vintage,
            custom_colors: Vec::new(),
            font_family: "sans-serif".to_string(),
            title_font_size: 16,
            label_font_size: 14,
            tick_font_size: 12,
            show_grid: true,
            show_legend: true,
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            systems: default_system_improvements(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            colored: true,
        }
    }
}
