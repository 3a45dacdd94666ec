//! Fonts bundled with the crate.
//!
//! Text is rendered with these faces whatever fonts the host has installed,
//! so a chart renders to the same pixels on every machine. The faces are
//! registered under the family names the style asks for.

use crate::StyleConfig;
use plotters::style::{register_font, FontStyle};
use studyviz_common::{Result, StudyVizError};

const REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Register the bundled faces under one family name
pub fn register_family(family: &str) -> Result<()> {
    for (style, bytes) in [(FontStyle::Normal, REGULAR), (FontStyle::Bold, BOLD)] {
        register_font(family, style, bytes).map_err(|_| {
            StudyVizError::graph(format!("Bundled font could not be registered as '{family}'"))
        })?;
    }
    Ok(())
}

/// Register the bundled faces for every family a style uses
pub fn register_style_fonts(style: &StyleConfig) -> Result<()> {
    for font in [&style.title_font, &style.label_font, &style.tick_font] {
        register_family(&font.family)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::style::{FontDesc, FontFamily};

    #[test]
    fn test_registered_family_measures_text() {
        register_family("studyviz-test").unwrap();

        let font = FontDesc::new(FontFamily::Name("studyviz-test"), 20.0, FontStyle::Normal);
        let (width, height) = font.box_size("Psilocybin").unwrap();
        assert!(width > 0 && height > 0);

        let bold = FontDesc::new(FontFamily::Name("studyviz-test"), 20.0, FontStyle::Bold);
        assert!(bold.box_size("Psilocybin").is_ok());
    }

    #[test]
    fn test_register_style_fonts() {
        let mut style = StyleConfig::default();
        style.tick_font.family = "serif".to_string();
        register_style_fonts(&style).unwrap();

        let font = FontDesc::new(FontFamily::Serif, 12.0, FontStyle::Normal);
        assert!(font.box_size("LSD").is_ok());
    }
}
