//! Chart types and styling structures

use plotters::style::{FontDesc, FontFamily, FontStyle};
use serde::{Deserialize, Serialize};

/// The three charts of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    StudyTypes,
    PsychedelicTimeline,
    SystemImprovements,
}

impl ChartKind {
    /// Default output file name
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ChartKind::StudyTypes => "study_types.png",
            ChartKind::PsychedelicTimeline => "psychedelic_timeline.png",
            ChartKind::SystemImprovements => "system_improvements.png",
        }
    }
}

/// Chart configuration: what to label and how large to draw it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Figure width in inches
    pub width_in: f64,
    /// Figure height in inches
    pub height_in: f64,
    pub style: StyleConfig,
}

impl ChartConfig {
    pub fn new(kind: ChartKind, title: &str, width_in: f64, height_in: f64) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: None,
            y_label: None,
            width_in,
            height_in,
            style: StyleConfig::default(),
        }
    }

    pub fn with_labels(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = Some(x_label.to_string());
        self.y_label = Some(y_label.to_string());
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    /// Bitmap size in pixels at the configured DPI
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.style.dpi as f64;
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }
}

/// Color scheme for bars and markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColorScheme {
    /// Warm desaturated tones
    Vintage,
    /// Darker earthy tones
    Muted,
    Custom(Vec<String>),
}

/// Font configuration, size in points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    pub family: String,
    pub size: u32,
    pub bold: bool,
}

impl FontConfig {
    pub fn new(family: &str, size: u32, bold: bool) -> Self {
        Self {
            family: family.to_string(),
            size,
            bold,
        }
    }

    /// Font size in pixels at the given DPI
    pub fn pixel_size(&self, dpi: u32) -> f64 {
        self.size as f64 * dpi as f64 / 72.0
    }

    /// Plotters font description at the given DPI
    pub fn to_font_desc(&self, dpi: u32) -> FontDesc<'_> {
        let style = if self.bold {
            FontStyle::Bold
        } else {
            FontStyle::Normal
        };
        FontDesc::new(FontFamily::from(self.family.as_str()), self.pixel_size(dpi), style)
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self::new("sans-serif", 12, false)
    }
}

/// Grid line configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub show: bool,
    pub color: String,
    /// Opacity of grid and reference lines
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            show: true,
            color: "#808080".to_string(),
            alpha: 0.3,
        }
    }
}

/// Stroke pattern for reference lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinePattern {
    Solid,
    Dashed,
    Dotted,
}

impl LinePattern {
    /// Dash and gap lengths in points
    pub fn dash_points(&self) -> Option<(f64, f64)> {
        match self {
            LinePattern::Solid => None,
            LinePattern::Dashed => Some((4.0, 2.0)),
            LinePattern::Dotted => Some((1.0, 2.0)),
        }
    }
}

/// Comprehensive styling configuration, passed explicitly to every render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    pub color_scheme: ColorScheme,
    pub background_color: Option<String>,
    /// Frame, tick and text color
    pub axis_color: String,
    pub dpi: u32,
    pub title_font: FontConfig,
    /// Axis description font
    pub label_font: FontConfig,
    /// Tick label and annotation font
    pub tick_font: FontConfig,
    pub grid: GridConfig,
    /// Outer margin in points
    pub margin: f64,
    pub show_legend: bool,
}

impl StyleConfig {
    /// Convert a length in points to pixels
    pub fn px(&self, points: f64) -> u32 {
        (points * self.dpi as f64 / 72.0).round().max(1.0) as u32
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Vintage,
            background_color: Some("#FFFFFF".to_string()),
            axis_color: "#000000".to_string(),
            dpi: 300,
            title_font: FontConfig::new("sans-serif", 16, true),
            label_font: FontConfig::new("sans-serif", 14, true),
            tick_font: FontConfig::new("sans-serif", 12, false),
            grid: GridConfig::default(),
            margin: 8.0,
            show_legend: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size_scales_with_dpi() {
        let config = ChartConfig::new(ChartKind::StudyTypes, "Test", 10.0, 6.0);
        assert_eq!(config.pixel_size(), (3000, 1800));

        let mut style = StyleConfig::default();
        style.dpi = 100;
        let config = config.with_style(style);
        assert_eq!(config.pixel_size(), (1000, 600));
    }

    #[test]
    fn test_font_pixel_size() {
        let font = FontConfig::new("sans-serif", 12, false);
        assert_eq!(font.pixel_size(72), 12.0);
        assert_eq!(font.pixel_size(300), 50.0);
    }

    #[test]
    fn test_points_to_pixels() {
        let style = StyleConfig::default();
        assert_eq!(style.px(72.0), 300);
        assert_eq!(style.px(0.0), 1);
    }

    #[test]
    fn test_default_style() {
        let style = StyleConfig::default();
        assert_eq!(style.color_scheme, ColorScheme::Vintage);
        assert_eq!(style.background_color.as_deref(), Some("#FFFFFF"));
        assert!(style.title_font.bold);
        assert_eq!(style.title_font.size, 16);
    }

    #[test]
    fn test_default_file_names() {
        assert_eq!(ChartKind::StudyTypes.default_file_name(), "study_types.png");
        assert_eq!(
            ChartKind::PsychedelicTimeline.default_file_name(),
            "psychedelic_timeline.png"
        );
        assert_eq!(
            ChartKind::SystemImprovements.default_file_name(),
            "system_improvements.png"
        );
    }

    #[test]
    fn test_line_patterns() {
        assert_eq!(LinePattern::Solid.dash_points(), None);
        assert_eq!(LinePattern::Dashed.dash_points(), Some((4.0, 2.0)));
        assert_eq!(LinePattern::Dotted.dash_points(), Some((1.0, 2.0)));
    }
}
