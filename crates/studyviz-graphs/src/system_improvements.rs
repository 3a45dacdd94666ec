//! Two-panel chart of improvement rates by physiological system

use crate::colormap::{normalized_index, rd_yl_bu};
use crate::{
    category_label, category_range, draw_labels_at, edge_label_overhang, integer_label,
    label_area_size, legend_marker_slot, longest_label, marker_radius, needs_rotation,
    rotated_label_style, ChartConfig, ChartKind, ChartRenderer, FontConfig, StyleConfig,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use studyviz_common::{default_system_improvements, Dataset, Result, StudyVizError, SystemImprovement};
use tracing::debug;

/// Bubble area per participant, in square points
pub const SIZE_SCALE: f64 = 20.0;
/// Bubble opacity
pub const BUBBLE_ALPHA: f64 = 0.6;
/// Upper bound of the percentage axis, leaving room for bar labels
pub const BAR_Y_MAX: f64 = 110.0;

/// One entry of the bubble size legend
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLegendEntry {
    /// Bubble area in square points
    pub size: f64,
    pub label: String,
}

/// Median of a sequence; the mean of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Legend label for a bubble size: the participant count it stands for, truncated
pub fn size_label(size: f64) -> String {
    format!("n={}", (size / SIZE_SCALE) as i64)
}

/// Bar label for a percentage, truncated to a whole number
pub fn percentage_label(percentage: f64) -> String {
    format!("{}%", percentage as i64)
}

/// The reference table with the values derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementData {
    pub systems: Vec<SystemImprovement>,
}

impl ImprovementData {
    pub fn new(systems: Vec<SystemImprovement>) -> Self {
        Self { systems }
    }

    pub fn names(&self) -> Vec<String> {
        self.systems.iter().map(|s| s.system.clone()).collect()
    }

    /// Bubble areas, `sample_size * 20` each
    pub fn bubble_sizes(&self) -> Vec<f64> {
        self.systems
            .iter()
            .map(|s| s.sample_size as f64 * SIZE_SCALE)
            .collect()
    }

    /// Bubble colors, from the system's position on the diverging map
    pub fn bubble_colors(&self) -> Vec<RGBColor> {
        let count = self.systems.len();
        (0..count)
            .map(|i| rd_yl_bu(normalized_index(i, count)))
            .collect()
    }

    /// Minimum, median and maximum bubble size
    pub fn size_legend(&self) -> Vec<SizeLegendEntry> {
        let sizes = self.bubble_sizes();
        let (Some(min), Some(mid), Some(max)) = (
            sizes.iter().copied().reduce(f64::min),
            median(&sizes),
            sizes.iter().copied().reduce(f64::max),
        ) else {
            return Vec::new();
        };

        [min, mid, max]
            .into_iter()
            .map(|size| SizeLegendEntry {
                size,
                label: size_label(size),
            })
            .collect()
    }

    /// Percentage axis range for the bubble panel
    pub fn bubble_x_range(&self) -> std::ops::Range<f64> {
        let min = self
            .systems
            .iter()
            .map(|s| s.improvement_percentage)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .systems
            .iter()
            .map(|s| s.improvement_percentage)
            .fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return 0.0..BAR_Y_MAX;
        }
        (min - 10.0)..(max + 10.0)
    }
}

impl Default for ImprovementData {
    fn default() -> Self {
        Self::new(default_system_improvements())
    }
}

/// Bar panel and bubble panel side by side, drawn from the reference table
#[derive(Debug)]
pub struct SystemImprovementsChart {
    pub data: ImprovementData,
    pub bubble_title: String,
    pub bubble_x_label: String,
}

impl SystemImprovementsChart {
    pub fn new(systems: Vec<SystemImprovement>) -> Self {
        Self {
            data: ImprovementData::new(systems),
            bubble_title: "Improvement Rate vs. Sample Size".to_string(),
            bubble_x_label: "Improvement Percentage (%)".to_string(),
        }
    }

    /// Create the chart with its default titles, labels and figure size
    pub fn with_config(style: StyleConfig, systems: Vec<SystemImprovement>) -> (Self, ChartConfig) {
        let config = ChartConfig::new(
            ChartKind::SystemImprovements,
            "Improvements by Physiological System",
            20.0,
            8.0,
        )
        .with_labels(
            "Physiological System",
            "Percentage of Participants Improved (%)",
        )
        .with_style(style);

        (Self::new(systems), config)
    }

    fn draw_bars<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        config: &ChartConfig,
    ) -> Result<()>
    where
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        let style = &config.style;
        let dpi = style.dpi;
        let axis_color = self.parse_color(&style.axis_color);
        let grid_color = self.parse_color(&style.grid.color);
        let colors = self.get_colors(&style.color_scheme);
        let line_px = style.px(1.0);

        let names = self.data.names();
        let rotate = needs_rotation(&names);

        let title_font = style.title_font.to_font_desc(dpi);
        let label_font = style.label_font.to_font_desc(dpi);
        let tick_font = style.tick_font.to_font_desc(dpi);

        let x_range = category_range(names.len());
        let mut chart = ChartBuilder::on(area)
            .caption(&config.title, title_font.color(&axis_color))
            .margin(style.px(style.margin))
            .x_label_area_size(label_area_size(style, longest_label(&names), rotate))
            .y_label_area_size(label_area_size(style, 3, true))
            .build_cartesian_2d(x_range.clone(), 0.0..BAR_Y_MAX)?;

        // Rotated labels are drawn separately below, anchored at their ticks
        let x_formatter = |x: &f64| {
            if rotate {
                String::new()
            } else {
                category_label(&names, *x)
            }
        };
        let y_formatter = |y: &f64| integer_label(*y);

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(names.len() + 1)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_label_style(tick_font.color(&axis_color))
            .y_label_style(tick_font.color(&axis_color))
            .x_desc(config.x_label.as_deref().unwrap_or("Physiological System"))
            .y_desc(config.y_label.as_deref().unwrap_or("Percentage of Participants Improved (%)"))
            .axis_desc_style(label_font.color(&axis_color))
            .axis_style(axis_color.stroke_width(line_px))
            .light_line_style(RGBAColor(0, 0, 0, 0.0).stroke_width(0))
            .bold_line_style(grid_color.mix(style.grid.alpha).stroke_width(line_px));
        if !style.grid.show {
            mesh.disable_y_mesh();
        }
        mesh.draw()?;

        chart.draw_series(self.data.systems.iter().enumerate().map(|(i, system)| {
            let color = colors[i % colors.len()];
            let x = i as f64;
            Rectangle::new(
                [(x - 0.4, 0.0), (x + 0.4, system.improvement_percentage)],
                color.filled(),
            )
        }))?;

        let value_font = FontConfig {
            bold: true,
            ..style.tick_font.clone()
        };
        let value_style = value_font
            .to_font_desc(dpi)
            .color(&axis_color)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(self.data.systems.iter().enumerate().map(|(i, system)| {
            Text::new(
                percentage_label(system.improvement_percentage),
                (i as f64, system.improvement_percentage + 1.0),
                value_style.clone(),
            )
        }))?;

        if rotate {
            let gap = style.px(5.0) as i32;
            let labels: Vec<(String, (i32, i32))> = names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let (x, y) = chart.backend_coord(&(i as f64, 0.0));
                    (name.clone(), (x, y + gap))
                })
                .collect();
            draw_labels_at(area, &labels, &rotated_label_style(&tick_font, &axis_color))?;
        }

        chart.plotting_area().draw(&Rectangle::new(
            [(x_range.start, 0.0), (x_range.end, BAR_Y_MAX)],
            axis_color.stroke_width(line_px),
        ))?;

        Ok(())
    }

    fn draw_bubbles<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        config: &ChartConfig,
    ) -> Result<()>
    where
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        let style = &config.style;
        let dpi = style.dpi;
        let axis_color = self.parse_color(&style.axis_color);
        let grid_color = self.parse_color(&style.grid.color);
        let bg_color = self.get_background_color(config);
        let line_px = style.px(1.0);

        let names = self.data.names();
        let sizes = self.data.bubble_sizes();
        let bubble_colors = self.data.bubble_colors();

        let title_font = style.title_font.to_font_desc(dpi);
        let label_font = style.label_font.to_font_desc(dpi);
        let tick_font = style.tick_font.to_font_desc(dpi);

        let x_range = self.data.bubble_x_range();
        let y_range = category_range(names.len());
        let mut chart = ChartBuilder::on(area)
            .caption(&self.bubble_title, title_font.color(&axis_color))
            .margin(style.px(style.margin))
            .margin_right(style.px(style.margin) + edge_label_overhang(style, 3))
            .x_label_area_size(label_area_size(style, 3, false))
            .y_label_area_size(label_area_size(style, longest_label(&names), true))
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        let x_formatter = |x: &f64| integer_label(*x);
        let y_formatter = |y: &f64| category_label(&names, *y);

        let mut mesh = chart.configure_mesh();
        mesh.y_labels(names.len() + 1)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .label_style(tick_font.color(&axis_color))
            .x_desc(self.bubble_x_label.as_str())
            .axis_desc_style(label_font.color(&axis_color))
            .axis_style(axis_color.stroke_width(line_px))
            .light_line_style(RGBAColor(0, 0, 0, 0.0).stroke_width(0))
            .bold_line_style(grid_color.mix(style.grid.alpha).stroke_width(line_px));
        if !style.grid.show {
            mesh.disable_mesh();
        }
        mesh.draw()?;

        chart.draw_series(self.data.systems.iter().enumerate().map(|(i, system)| {
            Circle::new(
                (system.improvement_percentage, i as f64),
                marker_radius(sizes[i], dpi),
                bubble_colors[i].mix(BUBBLE_ALPHA).filled(),
            )
        }))?;

        chart.plotting_area().draw(&Rectangle::new(
            [(x_range.start, y_range.start), (x_range.end, y_range.end)],
            axis_color.stroke_width(line_px),
        ))?;

        if style.show_legend {
            // Titled min/median/max size entries, registered as empty series
            let legend = self.data.size_legend();
            let max_radius = legend
                .iter()
                .map(|e| marker_radius(e.size, dpi))
                .max()
                .unwrap_or(1);
            // Largest legend marker is shrunk to the text height so rows stay apart
            let text_px = style.tick_font.pixel_size(dpi);
            let scale = (text_px * 0.5 / max_radius as f64).min(1.0);
            let marker = RGBColor(128, 128, 128).mix(BUBBLE_ALPHA).filled();

            chart
                .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
                .label("Sample Size")
                .legend(|(x, y)| EmptyElement::at((x, y)));

            let legend_radius = (max_radius as f64 * scale).round().max(1.0) as i32;
            let (legend_offset, legend_width) = legend_marker_slot(style, legend_radius);
            for entry in legend {
                let radius = (marker_radius(entry.size, dpi) as f64 * scale).round().max(1.0) as i32;
                chart
                    .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
                    .label(entry.label)
                    .legend(move |(x, y)| Circle::new((x + legend_offset, y), radius, marker));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
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

impl Default for SystemImprovementsChart {
    fn default() -> Self {
        Self::new(default_system_improvements())
    }
}

impl ChartRenderer for SystemImprovementsChart {
    fn name(&self) -> &'static str {
        "system improvements"
    }

    /// The chart draws the reference table only; the dataset is not read
    fn prepare(&mut self, _dataset: &Dataset) -> Result<()> {
        debug!(
            systems = self.data.systems.len(),
            "Using improvement reference table"
        );
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
        if self.data.systems.is_empty() {
            return Err(StudyVizError::graph(
                "No data available for system improvements chart",
            ));
        }

        self.apply_styling(root, config)?;

        let panels = root.split_evenly((1, 2));
        self.draw_bars(&panels[0], config)?;
        self.draw_bubbles(&panels[1], config)?;

        Ok(())
    }
}
