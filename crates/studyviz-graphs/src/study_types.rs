//! Study-type distribution bar chart

use crate::{
    category_label, category_range, draw_labels_at, integer_label, label_area_size, longest_label,
    needs_rotation, rotated_label_style, ChartConfig, ChartKind, ChartRenderer, FontConfig,
    StyleConfig,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::HashMap;
use studyviz_common::{columns, Dataset, Result, StudyVizError};
use tracing::debug;

/// Number of studies of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyTypeCount {
    pub study_type: String,
    pub count: u32,
}

/// Occurrences of each distinct study type, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyTypeCounts {
    pub entries: Vec<StudyTypeCount>,
}

impl StudyTypeCounts {
    /// Count values, skipping missing ones. Ties keep first-appearance order.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut entries: Vec<StudyTypeCount> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for value in values.into_iter().flatten() {
            match positions.get(&value) {
                Some(&idx) => entries[idx].count += 1,
                None => {
                    positions.insert(value.clone(), entries.len());
                    entries.push(StudyTypeCount {
                        study_type: value,
                        count: 1,
                    });
                }
            }
        }

        // Stable sort keeps first-appearance order among equal counts
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Self { entries }
    }

    /// Count the study type column of a dataset
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Ok(Self::from_values(dataset.category_column(columns::STUDY_TYPE)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count for one study type, if present
    pub fn get(&self, study_type: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.study_type == study_type)
            .map(|e| e.count)
    }

    /// Total number of counted (non-missing) values
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Vertical bar chart of study type frequencies
#[derive(Debug, Default)]
pub struct StudyTypesChart {
    /// Counts sorted by frequency (descending)
    pub data: Vec<StudyTypeCount>,
}

impl StudyTypesChart {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create the chart with its default title, labels and figure size
    pub fn with_config(style: StyleConfig) -> (Self, ChartConfig) {
        let config = ChartConfig::new(
            ChartKind::StudyTypes,
            "Distribution of Study Types",
            10.0,
            6.0,
        )
        .with_labels("Study Type", "Number of Studies")
        .with_style(style);

        (Self::new(), config)
    }

    /// Set data, sorting by count descending
    pub fn set_data(&mut self, mut data: Vec<StudyTypeCount>) {
        data.sort_by(|a, b| b.count.cmp(&a.count));
        self.data = data;
    }

    /// Study type names in bar order
    pub fn categories(&self) -> Vec<String> {
        self.data.iter().map(|d| d.study_type.clone()).collect()
    }

    /// Get max count for y-axis scaling, with 10% headroom for the labels
    fn get_max_count(&self) -> f64 {
        let max = self.data.iter().map(|d| d.count).max().unwrap_or(0);
        (max.max(1) as f64) * 1.1
    }

    fn format_label(&self, item: &StudyTypeCount) -> String {
        item.count.to_string()
    }
}

impl ChartRenderer for StudyTypesChart {
    fn name(&self) -> &'static str {
        "study types"
    }

    fn prepare(&mut self, dataset: &Dataset) -> Result<()> {
        let counts = StudyTypeCounts::from_dataset(dataset)?;
        debug!(
            categories = counts.len(),
            studies = counts.total(),
            "Counted study types"
        );
        self.set_data(counts.entries);
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
        if self.data.is_empty() {
            return Err(StudyVizError::graph(
                "No data available for study types chart",
            ));
        }

        self.apply_styling(root, config)?;

        let style = &config.style;
        let dpi = style.dpi;
        let axis_color = self.parse_color(&style.axis_color);
        let grid_color = self.parse_color(&style.grid.color);
        let colors = self.get_colors(&style.color_scheme);
        let line_px = style.px(1.0);

        let names = self.categories();
        let rotate = needs_rotation(&names);
        let y_max = self.get_max_count();

        let title_font = style.title_font.to_font_desc(dpi);
        let label_font = style.label_font.to_font_desc(dpi);
        let tick_font = style.tick_font.to_font_desc(dpi);

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, title_font.color(&axis_color))
            .margin(style.px(style.margin))
            .x_label_area_size(label_area_size(style, longest_label(&names), rotate))
            .y_label_area_size(label_area_size(style, 4, true))
            .build_cartesian_2d(category_range(names.len()), 0.0..y_max)?;

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
            .x_desc(config.x_label.as_deref().unwrap_or("Study Type"))
            .y_desc(config.y_label.as_deref().unwrap_or("Number of Studies"))
            .axis_desc_style(label_font.color(&axis_color))
            .axis_style(axis_color.stroke_width(line_px))
            .light_line_style(RGBAColor(0, 0, 0, 0.0).stroke_width(0))
            .bold_line_style(grid_color.mix(style.grid.alpha).stroke_width(line_px));
        if !style.grid.show {
            mesh.disable_y_mesh();
        }
        mesh.draw()?;

        // Bars, one per study type, palette wrapping past its length
        chart.draw_series(self.data.iter().enumerate().map(|(i, item)| {
            let color = colors[i % colors.len()];
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, item.count as f64)], color.filled())
        }))?;

        // Bold count labels centred above each bar
        let value_font = FontConfig {
            bold: true,
            ..style.tick_font.clone()
        };
        let value_style = value_font
            .to_font_desc(dpi)
            .color(&axis_color)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(self.data.iter().enumerate().map(|(i, item)| {
            Text::new(
                self.format_label(item),
                (i as f64, item.count as f64 + y_max * 0.01),
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
            draw_labels_at(root, &labels, &rotated_label_style(&tick_font, &axis_color))?;
        }

        let x_range = category_range(names.len());
        chart.plotting_area().draw(&Rectangle::new(
            [(x_range.start, 0.0), (x_range.end, y_max)],
            axis_color.stroke_width(line_px),
        ))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use studyviz_common::test_utils::study_fixtures::{sample_study_dataset, study_dataset};
    use studyviz_common::Cell;
    use tempfile::tempdir;

    fn values(items: &[&str]) -> Vec<Option<String>> {
        items.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn test_counts_most_frequent_first() {
        let counts = StudyTypeCounts::from_values(values(&["A", "A", "B"]));
        assert_eq!(
            counts.entries,
            vec![
                StudyTypeCount { study_type: "A".to_string(), count: 2 },
                StudyTypeCount { study_type: "B".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let counts = StudyTypeCounts::from_values(values(&["C", "B", "A", "B", "C"]));
        let order: Vec<&str> = counts.entries.iter().map(|e| e.study_type.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let counts =
            StudyTypeCounts::from_values(vec![Some("A".to_string()), None, Some("A".to_string())]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("A"), Some(2));
        assert_eq!(counts.get("B"), None);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_from_dataset() {
        let counts = StudyTypeCounts::from_dataset(&sample_study_dataset()).unwrap();
        assert_eq!(counts.entries[0].study_type, "Case report");
        assert_eq!(counts.get("Case report"), Some(4));
        assert_eq!(counts.get("Survey"), Some(2));
        assert_eq!(counts.total(), 8);
    }

    #[test]
    fn test_from_dataset_missing_column() {
        let dataset = Dataset::new(vec!["Author".to_string()], vec![vec![Cell::from("X")]]);
        let err = StudyTypeCounts::from_dataset(&dataset).unwrap_err();
        assert!(err.to_string().contains("Study type"));
    }

    #[test]
    fn test_prepare_and_config() {
        let (mut chart, config) = StudyTypesChart::with_config(StyleConfig::default());
        chart.prepare(&study_dataset(&[("A", "LSD", 2001), ("B", "LSD", 2002), ("B", "MDMA", 2003)]))
            .unwrap();

        assert_eq!(chart.categories(), vec!["B".to_string(), "A".to_string()]);
        assert_eq!(config.title, "Distribution of Study Types");
        assert_eq!(config.pixel_size(), (3000, 1800));
        assert_eq!(chart.get_max_count(), 2.0 * 1.1);
    }

    #[test]
    fn test_empty_data_is_graph_error() {
        let (chart, config) = StudyTypesChart::with_config(StyleConfig::default());
        let dir = tempdir().unwrap();
        let path = dir.path().join("study_types.png");

        let err = chart.render_to_file(&config, &path).unwrap_err();
        assert!(err.to_string().contains("No data available"));
        assert!(!path.exists());
    }

    #[test]
    fn test_render_to_file() {
        let (mut chart, mut config) = StudyTypesChart::with_config(StyleConfig::default());
        config.style.dpi = 50;
        chart.prepare(&sample_study_dataset()).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("study_types.png");
        chart.render_to_file(&config, &path).unwrap();
        assert!(path.exists());
    }

    proptest! {
        #[test]
        fn prop_counts_cover_every_present_value(
            items in prop::collection::vec(prop::option::of("[a-d]"), 0..60)
        ) {
            let present = items.iter().filter(|v| v.is_some()).count() as u32;
            let counts = StudyTypeCounts::from_values(items.clone());

            prop_assert_eq!(counts.total(), present);
            prop_assert!(counts.entries.windows(2).all(|w| w[0].count >= w[1].count));
            for entry in &counts.entries {
                let expected = items
                    .iter()
                    .filter(|v| v.as_deref() == Some(entry.study_type.as_str()))
                    .count() as u32;
                prop_assert_eq!(entry.count, expected);
            }
        }
    }
}
