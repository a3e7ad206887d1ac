use std::path::Path;

use egui::{Color32, FontId, TextStyle, Visuals, style::Widgets};
use log::info;
use serde::{Deserialize, Serialize};

use crate::LapDashError;

pub const DEFAULT_STYLESHEET_PATH: &str = "styles.json";

/// Colors, font sizes and spacing of the dashboard, loaded from a JSON stylesheet
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Stylesheet {
    pub background: [u8; 3],
    pub panel: [u8; 3],
    pub accent: [u8; 3],
    pub highlight: [u8; 3],
    pub text: [u8; 3],
    pub error: [u8; 3],
    pub body_font_size: f32,
    pub heading_font_size: f32,
    pub button_font_size: f32,
    pub table_row_height: f32,
    pub marker_radius: f32,
}

pub fn color(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

impl Stylesheet {
    /// Load the stylesheet. A missing or malformed file is an error, there is no built-in fallback.
    pub fn load(path: &Path) -> Result<Self, LapDashError> {
        let content = std::fs::read_to_string(path).map_err(|e| LapDashError::StylesheetMissing {
            path: format!("{}", path.display()),
            source: e,
        })?;
        let stylesheet = serde_json::from_str(&content).map_err(|e| LapDashError::InvalidStylesheet {
            path: format!("{}", path.display()),
            source: e,
        })?;
        info!("Loaded stylesheet {}", path.display());
        Ok(stylesheet)
    }

    pub fn visuals(&self) -> Visuals {
        Visuals {
            dark_mode: true,
            override_text_color: Some(color(self.text)),
            hyperlink_color: color(self.accent),
            faint_bg_color: color(self.panel),
            extreme_bg_color: color(self.highlight),
            panel_fill: color(self.background),
            window_fill: color(self.panel),
            button_frame: true,
            widgets: Widgets::dark(),
            striped: true,
            ..Default::default()
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_visuals(self.visuals());
        ctx.style_mut(|style| {
            style
                .text_styles
                .insert(TextStyle::Body, FontId::proportional(self.body_font_size));
            style
                .text_styles
                .insert(TextStyle::Button, FontId::proportional(self.button_font_size));
            style
                .text_styles
                .insert(TextStyle::Heading, FontId::proportional(self.heading_font_size));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_bundled_stylesheet_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_STYLESHEET_PATH);
        let stylesheet = Stylesheet::load(&path).unwrap();
        assert!(stylesheet.body_font_size > 0.);
        assert_eq!(stylesheet.visuals().panel_fill, color(stylesheet.background));
    }

    #[test]
    fn test_missing_stylesheet_fails() {
        match Stylesheet::load(Path::new("does-not-exist/styles.json")) {
            Err(LapDashError::StylesheetMissing { path, .. }) => {
                assert_eq!(path, "does-not-exist/styles.json")
            }
            _ => panic!("Expected StylesheetMissing error"),
        }
    }

    #[test]
    fn test_malformed_stylesheet_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"background": "black"}}"#).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            Stylesheet::load(file.path()),
            Err(LapDashError::InvalidStylesheet { .. })
        ));
    }
}
