//! Psychedelic usage timeline scatter chart

use crate::{
    category_label, category_range, dash_segments, edge_label_overhang, integer_label,
    label_area_size, legend_marker_slot, longest_label, marker_radius, ChartConfig, ChartKind,
    ChartRenderer, LinePattern, StyleConfig,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use studyviz_common::{columns, Dataset, Result, StudyRecord, StudyVizError};
use tracing::debug;

/// Marker area of the first study type level, in square points
pub const MAX_MARKER_AREA: f64 = 200.0;
/// Marker area of the last study type level, in square points
pub const MIN_MARKER_AREA: f64 = 100.0;
/// Marker opacity
pub const MARKER_ALPHA: f64 = 0.8;

/// A study type with its marker area
#[derive(Debug, Clone, PartialEq)]
pub struct StudyTypeLevel {
    pub name: String,
    pub marker_area: f64,
}

/// One plotted study
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelinePoint {
    pub year: i32,
    /// Row of the psychedelic on the y axis
    pub psychedelic_index: usize,
    /// Index into the study type levels
    pub level_index: usize,
}

/// Marker areas for `count` levels, linearly spaced from largest to smallest
pub fn marker_areas(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![MIN_MARKER_AREA],
        n => (0..n)
            .map(|k| {
                MAX_MARKER_AREA - (MAX_MARKER_AREA - MIN_MARKER_AREA) * k as f64 / (n - 1) as f64
            })
            .collect(),
    }
}

/// Unique values in order of first appearance
fn first_appearance<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

/// Everything the timeline draws, computed from the dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineData {
    /// Y axis categories and horizontal reference lines
    pub psychedelics: Vec<String>,
    /// Vertical reference lines, ascending without duplicates
    pub years: Vec<i32>,
    pub levels: Vec<StudyTypeLevel>,
    pub points: Vec<TimelinePoint>,
}

impl TimelineData {
    /// Compute from the dataset. Rows missing any field are not plotted,
    /// but still contribute their present values to the reference lines.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let records = dataset.records()?;
        let psychedelics = dataset.category_column(columns::PSYCHEDELIC)?;
        let years = dataset.year_column(columns::YEAR)?;
        Ok(Self::from_records(&records, &psychedelics, &years))
    }

    /// Build from the complete records plus the raw psychedelic and year
    /// columns the reference lines are drawn from
    pub fn from_records(
        records: &[StudyRecord],
        psychedelics: &[Option<String>],
        years: &[Option<i32>],
    ) -> Self {
        let categories = first_appearance(psychedelics.iter().flatten());
        let year_lines: BTreeSet<i32> = years.iter().flatten().copied().collect();

        let level_names = first_appearance(records.iter().map(|r| &r.study_type));
        let levels: Vec<StudyTypeLevel> = level_names
            .iter()
            .zip(marker_areas(level_names.len()))
            .map(|(name, marker_area)| StudyTypeLevel {
                name: name.clone(),
                marker_area,
            })
            .collect();

        let category_index: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let level_index: HashMap<&str, usize> = level_names
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        let points = records
            .iter()
            .filter_map(|record| {
                Some(TimelinePoint {
                    year: record.year,
                    psychedelic_index: *category_index.get(record.psychedelic.as_str())?,
                    level_index: *level_index.get(record.study_type.as_str())?,
                })
            })
            .collect();

        Self {
            psychedelics: categories,
            years: year_lines.into_iter().collect(),
            levels,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Year axis range, padded by one year each side
    pub fn year_range(&self) -> Option<Range<f64>> {
        let first = *self.years.first()?;
        let last = *self.years.last()?;
        Some((first - 1) as f64..(last + 1) as f64)
    }
}

/// Scatter of psychedelic against year, colored and sized by study type
#[derive(Debug, Default)]
pub struct PsychedelicTimelineChart {
    pub data: TimelineData,
}

impl PsychedelicTimelineChart {
    pub fn new() -> Self {
        Self {
            data: TimelineData::default(),
        }
    }

    /// Create the chart with its default title, labels and figure size
    pub fn with_config(style: StyleConfig) -> (Self, ChartConfig) {
        let config = ChartConfig::new(
            ChartKind::PsychedelicTimeline,
            "Psychedelic Usage Timeline by Study Type",
            12.0,
            6.0,
        )
        .with_labels("Year", "Psychedelic")
        .with_style(style);

        (Self::new(), config)
    }

    pub fn set_data(&mut self, data: TimelineData) {
        self.data = data;
    }
}

/// Dash and gap of a line pattern converted to data units
fn pattern_in_units(pattern: LinePattern, style: &StyleConfig, units_per_px: f64) -> (f64, f64) {
    match pattern.dash_points() {
        Some((dash, gap)) => (
            style.px(dash) as f64 * units_per_px,
            style.px(gap) as f64 * units_per_px,
        ),
        None => (0.0, 0.0),
    }
}

impl ChartRenderer for PsychedelicTimelineChart {
    fn name(&self) -> &'static str {
        "psychedelic timeline"
    }

    fn prepare(&mut self, dataset: &Dataset) -> Result<()> {
        let data = TimelineData::from_dataset(dataset)?;
        debug!(
            points = data.points.len(),
            psychedelics = data.psychedelics.len(),
            years = data.years.len(),
            study_types = data.levels.len(),
            "Computed timeline data"
        );
        self.set_data(data);
        Ok(())
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &ChartConfig,
    ) -> Result<()>
    where
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        let x_range = match self.data.year_range() {
            Some(range) if !self.data.is_empty() => range,
            _ => {
                return Err(StudyVizError::graph(
                    "No data available for psychedelic timeline chart",
                ))
            }
        };
        let y_range = category_range(self.data.psychedelics.len());

        self.apply_styling(root, config)?;

        let style = &config.style;
        let dpi = style.dpi;
        let axis_color = self.parse_color(&style.axis_color);
        let grid_color = self.parse_color(&style.grid.color);
        let bg_color = self.get_background_color(config);
        let colors = self.get_colors(&style.color_scheme);
        let line_px = style.px(1.0);

        let title_font = style.title_font.to_font_desc(dpi);
        let label_font = style.label_font.to_font_desc(dpi);
        let tick_font = style.tick_font.to_font_desc(dpi);

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, title_font.color(&axis_color))
            .margin(style.px(style.margin))
            .margin_right(style.px(style.margin) + edge_label_overhang(style, 4))
            .x_label_area_size(label_area_size(style, 4, false))
            .y_label_area_size(label_area_size(
                style,
                longest_label(&self.data.psychedelics),
                true,
            ))
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        let span = (x_range.end - x_range.start).max(1.0);
        let x_formatter = |x: &f64| integer_label(*x);
        let y_formatter = |y: &f64| category_label(&self.data.psychedelics, *y);

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels((span as usize + 1).min(12))
            .y_labels(self.data.psychedelics.len() + 1)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .label_style(tick_font.color(&axis_color))
            .x_desc(config.x_label.as_deref().unwrap_or("Year"))
            .y_desc(config.y_label.as_deref().unwrap_or("Psychedelic"))
            .axis_desc_style(label_font.color(&axis_color))
            .axis_style(axis_color.stroke_width(line_px))
            .draw()?;

        // Reference lines sit beneath the markers
        if style.grid.show {
            let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
            let x_units = span / plot_w.max(1) as f64;
            let y_units = (y_range.end - y_range.start) / plot_h.max(1) as f64;
            let reference_style = grid_color.mix(style.grid.alpha).stroke_width(line_px);

            let (dot, dot_gap) = pattern_in_units(LinePattern::Dotted, style, x_units);
            let mut horizontal = Vec::new();
            for i in 0..self.data.psychedelics.len() {
                let y = i as f64;
                for (a, b) in dash_segments(x_range.start, x_range.end, dot, dot_gap) {
                    horizontal.push(vec![(a, y), (b, y)]);
                }
            }

            let (dash, dash_gap) = pattern_in_units(LinePattern::Dashed, style, y_units);
            let mut vertical = Vec::new();
            for year in &self.data.years {
                let x = *year as f64;
                for (a, b) in dash_segments(y_range.start, y_range.end, dash, dash_gap) {
                    vertical.push(vec![(x, a), (x, b)]);
                }
            }

            chart.draw_series(
                horizontal
                    .into_iter()
                    .chain(vertical)
                    .map(|points| PathElement::new(points, reference_style)),
            )?;
        }

        // One series per study type level so each gets a legend entry
        let legend_radius = self
            .data
            .levels
            .iter()
            .map(|level| marker_radius(level.marker_area, dpi))
            .max()
            .unwrap_or(1);
        let (legend_offset, legend_width) = legend_marker_slot(style, legend_radius);
        for (level_index, level) in self.data.levels.iter().enumerate() {
            let color = colors[level_index % colors.len()];
            let radius = marker_radius(level.marker_area, dpi);
            let marker = color.mix(MARKER_ALPHA).filled();

            let series = chart.draw_series(
                self.data
                    .points
                    .iter()
                    .filter(|p| p.level_index == level_index)
                    .map(|p| {
                        Circle::new((p.year as f64, p.psychedelic_index as f64), radius, marker)
                    }),
            )?;
            series
                .label(level.name.clone())
                .legend(move |(x, y)| Circle::new((x + legend_offset, y), radius, marker));
        }

        chart.plotting_area().draw(&Rectangle::new(
            [(x_range.start, y_range.start), (x_range.end, y_range.end)],
            axis_color.stroke_width(line_px),
        ))?;

        if style.show_legend {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .margin(style.px(4.0))
                .legend_area_size(legend_width)
                .background_style(&bg_color.mix(0.85))
                .border_style(axis_color.stroke_width(line_px))
                .label_font(tick_font.color(&axis_color))
                .draw()?;
        }

        Ok(())
    }
}
