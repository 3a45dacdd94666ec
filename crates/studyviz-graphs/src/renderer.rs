//! Chart rendering trait and shared drawing helpers

use crate::{ChartConfig, ColorScheme, StyleConfig};
use crate::fonts::register_style_fonts;
use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::fs;
use std::path::Path;
use studyviz_common::{Dataset, Result, StudyVizError};

/// Vintage palette: warm, desaturated tones
pub const VINTAGE_PALETTE: [RGBColor; 5] = [
    RGBColor(0x9B, 0x83, 0x57), // Khaki
    RGBColor(0x7D, 0x9B, 0x76), // Sage
    RGBColor(0x7B, 0x92, 0xA8), // Slate blue
    RGBColor(0x95, 0x7D, 0x8D), // Mauve
    RGBColor(0xA6, 0x7F, 0x81), // Dusty rose
];

/// Muted palette: darker earth tones
pub const MUTED_PALETTE: [RGBColor; 5] = [
    RGBColor(0x96, 0x61, 0x3D), // Brown
    RGBColor(0x3C, 0x6E, 0x47), // Forest green
    RGBColor(0x4F, 0x6D, 0x7A), // Steel blue
    RGBColor(0x6B, 0x4E, 0x71), // Plum
    RGBColor(0x8B, 0x57, 0x5C), // Burgundy
];

/// Trait for charts: compute data from a dataset, then draw it on any backend
pub trait ChartRenderer {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Compute the chart data from the loaded dataset
    fn prepare(&mut self, dataset: &Dataset) -> Result<()>;

    /// Draw the prepared chart onto a drawing area
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &ChartConfig,
    ) -> Result<()>
    where
        DB::ErrorType: std::error::Error + Send + Sync + 'static;

    /// Render the chart to a PNG file.
    ///
    /// The file is only written once drawing and encoding have succeeded.
    fn render_to_file(&self, config: &ChartConfig, path: &Path) -> Result<()> {
        let png = self.render_to_bytes(config)?;
        fs::write(path, png).map_err(|e| {
            StudyVizError::graph_with_source(format!("Failed to write {}", path.display()), e)
        })?;

        tracing::info!("Successfully rendered {} chart to {}", self.name(), path.display());
        Ok(())
    }

    /// Render the chart into an RGB image
    fn render_to_image(&self, config: &ChartConfig) -> Result<RgbImage> {
        let (width, height) = config.pixel_size();
        let buffer = self.render_to_buffer(config)?;
        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| StudyVizError::graph("Pixel buffer does not match image size"))
    }

    /// Render the chart into a raw RGB pixel buffer
    fn render_to_buffer(&self, config: &ChartConfig) -> Result<Vec<u8>> {
        register_style_fonts(&config.style)?;

        let (width, height) = config.pixel_size();
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.draw(&root, config)?;
            root.present()?;
        }
        Ok(buffer)
    }

    /// Render the chart to PNG-encoded bytes carrying the configured DPI
    fn render_to_bytes(&self, config: &ChartConfig) -> Result<Vec<u8>> {
        let image = self.render_to_image(config)?;
        let png = encode_png(&image, config.style.dpi)?;

        tracing::debug!("Encoded {} chart as PNG in memory", self.name());
        Ok(png)
    }

    /// Fill the drawing area with the background color
    fn apply_styling<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &ChartConfig,
    ) -> Result<()>
    where
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        let bg_color = self.get_background_color(config);
        root.fill(&bg_color)?;
        Ok(())
    }

    /// Get colors from color scheme
    fn get_colors(&self, scheme: &ColorScheme) -> Vec<RGBColor> {
        match scheme {
            ColorScheme::Vintage => VINTAGE_PALETTE.to_vec(),
            ColorScheme::Muted => MUTED_PALETTE.to_vec(),
            ColorScheme::Custom(colors) if !colors.is_empty() => colors
                .iter()
                .map(|color_str| self.parse_color(color_str))
                .collect(),
            ColorScheme::Custom(_) => VINTAGE_PALETTE.to_vec(),
        }
    }

    /// Parse a color string (hex format) to RGBColor, black if unparseable
    fn parse_color(&self, color_str: &str) -> RGBColor {
        parse_hex_color(color_str).unwrap_or(RGBColor(0, 0, 0))
    }

    /// Get background color from style config
    fn get_background_color(&self, config: &ChartConfig) -> RGBColor {
        config
            .style
            .background_color
            .as_ref()
            .map(|color| self.parse_color(color))
            .unwrap_or(RGBColor(255, 255, 255))
    }
}

/// Pixels per meter for a resolution in dots per inch
pub fn dots_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}

/// Encode an RGB image as PNG, recording the resolution in a `pHYs` chunk
pub fn encode_png(image: &RgbImage, dpi: u32) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = dots_per_meter(dpi);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));

        let mut writer = encoder
            .write_header()
            .map_err(|e| StudyVizError::graph_with_source("Failed to encode PNG", e))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| StudyVizError::graph_with_source("Failed to encode PNG", e))?;
        writer
            .finish()
            .map_err(|e| StudyVizError::graph_with_source("Failed to encode PNG", e))?;
    }
    Ok(bytes)
}

/// Parse a `#RRGGBB` color
pub fn parse_hex_color(color_str: &str) -> Option<RGBColor> {
    let hex = color_str.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}

/// Tick label for a categorical axis laid out at integer positions.
///
/// Positions that are not (close to) an integer index get an empty label.
pub fn category_label(names: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    names.get(rounded as usize).cloned().unwrap_or_default()
}

/// Tick label for whole numbers only, empty for fractional positions
pub fn integer_label(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 {
        String::new()
    } else {
        format!("{:.0}", rounded)
    }
}

/// Axis range for `count` categories centred on `0..count`
pub fn category_range(count: usize) -> std::ops::Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

/// Split the interval `[start, end]` into on/off dashes.
///
/// `dash` and `gap` are in the same units as the interval. A non-positive
/// dash or gap yields one solid segment.
pub fn dash_segments(start: f64, end: f64, dash: f64, gap: f64) -> Vec<(f64, f64)> {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    if dash <= 0.0 || gap <= 0.0 {
        return vec![(lo, hi)];
    }

    let mut segments = Vec::new();
    let mut pos = lo;
    while pos < hi {
        segments.push((pos, (pos + dash).min(hi)));
        pos += dash + gap;
    }
    segments
}

/// Pixel space reserved next to an axis for its tick labels and description.
///
/// `across` is true when label text runs away from the axis (rotated x
/// labels, or horizontal labels on a y axis).
pub fn label_area_size(style: &StyleConfig, longest_label: usize, across: bool) -> u32 {
    let tick_px = style.tick_font.pixel_size(style.dpi);
    let label_px = style.label_font.pixel_size(style.dpi);
    let text_px = if across {
        longest_label as f64 * tick_px * 0.62
    } else {
        tick_px
    };
    (text_px + label_px * 2.0 + style.px(10.0) as f64).round() as u32
}

/// Text style for category labels turned a quarter turn clockwise.
///
/// The anchor is the start of the text, so a label drawn at a tick reads
/// downwards from it, centred on the tick.
pub fn rotated_label_style<'a>(font: &FontDesc<'a>, color: &RGBColor) -> TextStyle<'a> {
    font.transform(FontTransform::Rotate90)
        .color(color)
        .pos(Pos::new(HPos::Left, VPos::Center))
}

/// Draw labels at backend pixel positions, e.g. from `ChartContext::backend_coord`
pub fn draw_labels_at<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    labels: &[(String, (i32, i32))],
    style: &TextStyle,
) -> Result<()>
where
    DB::ErrorType: std::error::Error + Send + Sync + 'static,
{
    let (base_x, base_y) = area.get_base_pixel();
    for (text, (x, y)) in labels {
        area.draw_text(text, style, (x - base_x, y - base_y))?;
    }
    Ok(())
}

/// Pixels a tick label of `chars` characters extends past its centred tick,
/// reserved as extra margin where a label sits on the plot edge
pub fn edge_label_overhang(style: &StyleConfig, chars: usize) -> u32 {
    (chars as f64 * style.tick_font.pixel_size(style.dpi) * 0.65 / 2.0).ceil() as u32
}

/// Legend icon slot for round markers up to `max_radius` pixels: the offset
/// of the marker centre from the slot's left edge and the slot width
pub fn legend_marker_slot(style: &StyleConfig, max_radius: i32) -> (i32, u32) {
    let radius = max_radius.max(1);
    (radius, radius as u32 * 2 + style.px(4.0))
}

/// Marker radius in pixels for a marker area given in square points
pub fn marker_radius(area_pt2: f64, dpi: u32) -> i32 {
    let diameter_pt = area_pt2.max(0.0).sqrt();
    ((diameter_pt / 2.0) * dpi as f64 / 72.0).round().max(1.0) as i32
}

/// Whether category labels are long enough to need rotating
pub fn needs_rotation(names: &[String]) -> bool {
    let total: usize = names.iter().map(|n| n.chars().count()).sum();
    names.iter().any(|n| n.chars().count() > 14) || total > 60
}

/// Length in characters of the longest label
pub fn longest_label(names: &[String]) -> usize {
    names.iter().map(|n| n.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#9B8357"), Some(RGBColor(0x9B, 0x83, 0x57)));
        assert_eq!(parse_hex_color("#ffffff"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_hex_color("9B8357"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_category_label() {
        let names = vec!["Case report".to_string(), "Survey".to_string()];
        assert_eq!(category_label(&names, 0.0), "Case report");
        assert_eq!(category_label(&names, 1.0000001), "Survey");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, -1.0), "");
        assert_eq!(category_label(&names, 2.0), "");
    }

    #[test]
    fn test_integer_label() {
        assert_eq!(integer_label(2019.0), "2019");
        assert_eq!(integer_label(2019.5), "");
    }

    #[test]
    fn test_category_range() {
        assert_eq!(category_range(3), -0.5..2.5);
        assert_eq!(category_range(0), -0.5..0.5);
    }

    #[test]
    fn test_dash_segments() {
        assert_eq!(dash_segments(0.0, 10.0, 3.0, 1.0), vec![(0.0, 3.0), (4.0, 7.0), (8.0, 10.0)]);
        assert_eq!(dash_segments(10.0, 0.0, 3.0, 1.0), vec![(0.0, 3.0), (4.0, 7.0), (8.0, 10.0)]);
        assert_eq!(dash_segments(0.0, 5.0, 0.0, 1.0), vec![(0.0, 5.0)]);
        assert!(dash_segments(1.0, 1.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_marker_radius() {
        // 900 pt² is a 30 pt wide marker, 15 pt radius
        assert_eq!(marker_radius(900.0, 72), 15);
        assert_eq!(marker_radius(900.0, 300), 63);
        assert_eq!(marker_radius(0.0, 300), 1);
    }

    #[test]
    fn test_edge_label_overhang() {
        let style = StyleConfig {
            dpi: 72,
            ..StyleConfig::default()
        };
        // Four 12 pt digits at 72 DPI, half of roughly 31 px
        assert_eq!(edge_label_overhang(&style, 4), 16);
        assert_eq!(edge_label_overhang(&style, 0), 0);
    }

    #[test]
    fn test_legend_marker_slot_holds_marker() {
        let style = StyleConfig::default();
        for max_radius in [0, 1, 29, 63] {
            let (offset, width) = legend_marker_slot(&style, max_radius);
            assert!(offset - max_radius >= 0);
            assert!((offset + max_radius) as u32 <= width);
        }
    }

    #[test]
    fn test_needs_rotation() {
        let short = vec!["Survey".to_string(), "Case report".to_string()];
        assert!(!needs_rotation(&short));

        let long = vec!["Genitourinary & reproductive".to_string()];
        assert!(needs_rotation(&long));
        assert_eq!(longest_label(&long), 28);
        assert_eq!(longest_label(&[]), 0);
    }

    #[test]
    fn test_dots_per_meter() {
        assert_eq!(dots_per_meter(300), 11811);
        assert_eq!(dots_per_meter(72), 2835);
    }

    #[test]
    fn test_png_records_resolution() {
        let image = RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255]));
        let png_bytes = encode_png(&image, 300).unwrap();

        let decoder = png::Decoder::new(std::io::Cursor::new(png_bytes));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (4, 3));
        let dims = info.pixel_dims.expect("pHYs chunk");
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.yppu, 11811);
        assert_eq!(dims.unit, png::Unit::Meter);
    }

    #[test]
    fn test_rotated_labels_start_at_anchor() {
        crate::fonts::register_family("sans-serif").unwrap();
        let font = FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal);
        let style = rotated_label_style(&font, &BLACK);
        assert_eq!(style.pos, Pos::new(HPos::Left, VPos::Center));

        let (width, height) = (120u32, 240u32);
        let anchor = (60, 20);
        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            let labels = vec![("Genitourinary".to_string(), anchor)];
            draw_labels_at(&root, &labels, &style).unwrap();
            root.present().unwrap();
        }

        let inked: Vec<(u32, u32)> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|(x, y)| buffer[((y * width + x) * 3) as usize] < 128)
            .collect();
        assert!(!inked.is_empty());
        // Nothing above the anchor, text runs down and stays near the tick
        assert!(inked.iter().all(|(_, y)| *y + 1 >= anchor.1 as u32));
        assert!(inked.iter().any(|(_, y)| *y > anchor.1 as u32 + 60));
        assert!(inked.iter().all(|(x, _)| x.abs_diff(anchor.0 as u32) <= 16));
    }

    struct Dummy;

    impl ChartRenderer for Dummy {
        fn name(&self) -> &'static str {
            "dummy"
        }

        fn prepare(&mut self, _dataset: &Dataset) -> Result<()> {
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
            self.apply_styling(root, config)
        }
    }

    #[test]
    fn test_get_colors() {
        let dummy = Dummy;
        assert_eq!(dummy.get_colors(&ColorScheme::Vintage), VINTAGE_PALETTE.to_vec());
        assert_eq!(dummy.get_colors(&ColorScheme::Muted)[0], RGBColor(0x96, 0x61, 0x3D));
        assert_eq!(
            dummy.get_colors(&ColorScheme::Custom(vec!["#010203".to_string()])),
            vec![RGBColor(1, 2, 3)]
        );
        assert_eq!(dummy.get_colors(&ColorScheme::Custom(Vec::new())).len(), 5);
        assert_eq!(dummy.parse_color("nonsense"), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_background_fill_in_buffer() {
        let dummy = Dummy;
        let mut style = StyleConfig::default();
        style.dpi = 10;
        style.background_color = Some("#102030".to_string());
        let config = ChartConfig::new(crate::ChartKind::StudyTypes, "Test", 2.0, 1.0).with_style(style);

        let buffer = dummy.render_to_buffer(&config).unwrap();
        assert_eq!(buffer.len(), 20 * 10 * 3);
        assert_eq!(&buffer[0..3], &[0x10, 0x20, 0x30]);

        let png = dummy.render_to_bytes(&config).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dummy.png");
        dummy.render_to_file(&config, &path).unwrap();
        let written = image::open(&path).unwrap().to_rgb8();
        assert_eq!(written.dimensions(), (20, 10));
        assert_eq!(written.get_pixel(5, 5).0, [0x10, 0x20, 0x30]);

        let missing_dir = dir.path().join("missing").join("dummy.png");
        assert!(dummy.render_to_file(&config, &missing_dir).is_err());
    }
}
