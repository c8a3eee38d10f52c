//! Run configuration: colors, render options, and the optional preset file
//!
//! All user input is validated once, before any frame is processed. The
//! validated [`RenderConfig`] is immutable for the duration of a run.

use std::collections::HashMap;
use std::str::FromStr;

use image::Rgb;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::palette::{Palette, PalettePreset};

/// A color as the user supplied it: either a decimal triple or a hex string.
///
/// Resolution to an 8-bit RGB triple happens at validation time so that
/// out-of-range channels and malformed hex are rejected before the run
/// starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    Rgb(u32, u32, u32),
    Hex(String),
}

impl ColorSpec {
    /// Resolve to a canonical RGB triple, naming `field` in any error.
    pub fn resolve(&self, field: &'static str) -> Result<Rgb<u8>> {
        match self {
            ColorSpec::Rgb(r, g, b) => {
                for channel in [r, g, b] {
                    if *channel > 255 {
                        return Err(Error::config(
                            field,
                            format!("color channel {} is out of range 0-255", channel),
                        ));
                    }
                }
                Ok(Rgb([*r as u8, *g as u8, *b as u8]))
            }
            ColorSpec::Hex(text) => {
                let digits = text.strip_prefix('#').unwrap_or(text);
                if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::config(
                        field,
                        format!("'{}' is not a #RRGGBB hex color", text),
                    ));
                }
                let channel = |span: &str| u8::from_str_radix(span, 16).unwrap();
                Ok(Rgb([
                    channel(&digits[0..2]),
                    channel(&digits[2..4]),
                    channel(&digits[4..6]),
                ]))
            }
        }
    }
}

impl FromStr for ColorSpec {
    type Err = Error;

    /// Classify a color argument. `"R,G,B"` becomes [`ColorSpec::Rgb`],
    /// anything else is treated as a hex string and validated on resolve.
    fn from_str(text: &str) -> Result<Self> {
        if text.contains(',') {
            let parts: Vec<&str> = text.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(Error::config(
                    "color",
                    format!("'{}' must have exactly three components", text),
                ));
            }
            let mut channels = [0u32; 3];
            for (slot, part) in channels.iter_mut().zip(&parts) {
                *slot = part.parse::<u32>().map_err(|_| {
                    Error::config("color", format!("'{}' is not an integer channel", part))
                })?;
            }
            Ok(ColorSpec::Rgb(channels[0], channels[1], channels[2]))
        } else {
            Ok(ColorSpec::Hex(text.to_string()))
        }
    }
}

/// Palette selection: a named preset or a custom glyph string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteChoice {
    Preset(PalettePreset),
    Custom(String),
}

impl PaletteChoice {
    /// Parse a config-file palette value. The three preset names are
    /// reserved; any other string is a custom glyph set.
    pub fn parse(text: &str) -> Self {
        match text {
            "short" => PaletteChoice::Preset(PalettePreset::Short),
            "medium" => PaletteChoice::Preset(PalettePreset::Medium),
            "long" => PaletteChoice::Preset(PalettePreset::Long),
            custom => PaletteChoice::Custom(custom.to_string()),
        }
    }

    fn build(&self, reverse: bool) -> Result<Palette> {
        match self {
            PaletteChoice::Preset(preset) => Ok(Palette::preset(*preset, reverse)),
            PaletteChoice::Custom(glyphs) => Palette::custom(glyphs, reverse),
        }
    }
}

/// Unvalidated per-run settings as gathered from the CLI or a preset
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Glyph cell font size in pixels
    pub font_size: u32,
    pub palette: PaletteChoice,
    /// Flip the palette so index 0 maps to the light end
    pub reverse: bool,
    pub foreground: ColorSpec,
    pub background: ColorSpec,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_size: 15,
            palette: PaletteChoice::Preset(PalettePreset::Medium),
            reverse: false,
            foreground: ColorSpec::Rgb(255, 255, 255),
            background: ColorSpec::Rgb(0, 0, 0),
        }
    }
}

impl RenderOptions {
    /// Validate everything up front and freeze the run configuration.
    pub fn validate(&self) -> Result<RenderConfig> {
        if self.font_size == 0 {
            return Err(Error::config("font-size", "must be at least 1"));
        }
        let palette = self.palette.build(self.reverse)?;
        let foreground = self.foreground.resolve("foreground")?;
        let background = self.background.resolve("background")?;
        Ok(RenderConfig {
            font_size: self.font_size,
            // Glyphs are drawn doubled, so a cell is one pixel wider than
            // the font size. Matches the layout the ramps were tuned for.
            cell_width: self.font_size + 1,
            cell_height: self.font_size,
            palette,
            foreground,
            background,
        })
    }
}

/// Immutable, validated per-run render configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub font_size: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub palette: Palette,
    pub foreground: Rgb<u8>,
    pub background: Rgb<u8>,
}

impl RenderConfig {
    /// Glyph grid geometry for a frame of the given pixel dimensions.
    ///
    /// Fails with [`Error::InvalidDimensions`] when the frame cannot fit a
    /// single glyph cell.
    pub fn grid_for(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        let rows = height / self.cell_height;
        let cols = width / self.cell_width;
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok((rows, cols))
    }
}

fn default_reverse() -> bool {
    false
}

/// One named preset in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub font_size: u32,
    pub palette: String,
    #[serde(default = "default_reverse")]
    pub reverse: bool,
    pub foreground: String,
    pub background: String,
}

impl Preset {
    /// Turn a file preset into render options, parsing its color strings.
    pub fn to_options(&self) -> Result<RenderOptions> {
        Ok(RenderOptions {
            font_size: self.font_size,
            palette: PaletteChoice::parse(&self.palette),
            reverse: self.reverse,
            foreground: ColorSpec::from_str(&self.foreground)?,
            background: ColorSpec::from_str(&self.background)?,
        })
    }
}

/// Application configuration with named presets
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub presets: HashMap<String, Preset>,
    pub default_preset: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let default_json = r#"{
            "presets": {
                "default": {"font_size": 15, "palette": "medium", "foreground": "255,255,255", "background": "0,0,0"},
                "fine":    {"font_size": 8,  "palette": "long",   "foreground": "255,255,255", "background": "0,0,0"},
                "coarse":  {"font_size": 24, "palette": "short",  "foreground": "255,255,255", "background": "0,0,0"}
            },
            "default_preset": "default"
        }"#;
        serde_json::from_str(default_json).unwrap()
    }
}

impl AppConfig {
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_triple_parses_and_resolves() {
        let spec = ColorSpec::from_str("12, 34, 56").unwrap();
        assert_eq!(spec, ColorSpec::Rgb(12, 34, 56));
        assert_eq!(spec.resolve("foreground").unwrap(), Rgb([12, 34, 56]));
    }

    #[test]
    fn hex_parses_with_and_without_hash() {
        for text in ["#ff8000", "ff8000"] {
            let spec = ColorSpec::from_str(text).unwrap();
            assert_eq!(spec.resolve("background").unwrap(), Rgb([255, 128, 0]));
        }
    }

    #[test]
    fn out_of_range_channel_is_rejected() {
        let spec = ColorSpec::Rgb(256, 0, 0);
        match spec.resolve("foreground") {
            Err(Error::Config { field, .. }) => assert_eq!(field, "foreground"),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_colors_are_rejected() {
        assert!(ColorSpec::from_str("1,2").is_err());
        assert!(ColorSpec::from_str("a,b,c").is_err());
        assert!(ColorSpec::Hex("#12345".into()).resolve("foreground").is_err());
        assert!(ColorSpec::Hex("zzzzzz".into()).resolve("foreground").is_err());
    }

    #[test]
    fn zero_font_size_is_rejected() {
        let options = RenderOptions {
            font_size: 0,
            ..RenderOptions::default()
        };
        match options.validate() {
            Err(Error::Config { field, .. }) => assert_eq!(field, "font-size"),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn validation_freezes_cell_geometry() {
        let config = RenderOptions::default().validate().unwrap();
        assert_eq!(config.cell_height, 15);
        assert_eq!(config.cell_width, 16);
        assert_eq!(config.palette.len(), 37);
    }

    #[test]
    fn grid_dimensions_floor() {
        let config = RenderOptions::default().validate().unwrap();
        // 640x480 frame with 16x15 cells
        assert_eq!(config.grid_for(640, 480).unwrap(), (32, 40));
    }

    #[test]
    fn undersized_frame_is_rejected() {
        let config = RenderOptions::default().validate().unwrap();
        match config.grid_for(10, 480) {
            Err(Error::InvalidDimensions { width, .. }) => assert_eq!(width, 10),
            other => panic!("expected InvalidDimensions, got {:?}", other),
        }
    }

    #[test]
    fn builtin_config_presets_validate() {
        let config = AppConfig::default();
        let preset = config.preset(&config.default_preset).unwrap();
        let options = preset.to_options().unwrap();
        assert!(options.validate().is_ok());
    }
}
