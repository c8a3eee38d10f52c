//! Glyph compositing onto full-resolution frame canvases
//!
//! The compositor turns a per-frame luminance grid back into a raster image
//! of the source frame's exact dimensions. Every cell draws its glyph twice
//! side by side: monospace glyphs are taller than wide, and doubling them
//! keeps the cells close to square so the output is not vertically
//! stretched.

use std::fs;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::RgbImage;
use imageproc::drawing::draw_text_mut;

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::frames::LumaGrid;
use crate::palette::quantize;

/// A loaded TrueType/OpenType face used to rasterize glyphs
pub struct Typeface {
    font: FontVec,
}

impl Typeface {
    /// Load a font file from an explicit path.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| {
            Error::config("font", format!("cannot read {}: {}", path.display(), e))
        })?;
        let font = FontVec::try_from_vec(data).map_err(|_| {
            Error::config(
                "font",
                format!("{} is not a usable TrueType/OpenType font", path.display()),
            )
        })?;
        Ok(Self { font })
    }

    /// Find a monospace face in the platform's usual font locations.
    pub fn discover() -> Result<Self> {
        for candidate in font_candidates() {
            let path = Path::new(candidate);
            if path.is_file() {
                if let Ok(typeface) = Self::load(path) {
                    return Ok(typeface);
                }
            }
        }
        Err(Error::config(
            "font",
            "no monospace font found in the usual locations; pass one with --font",
        ))
    }
}

fn font_candidates() -> &'static [&'static str] {
    if cfg!(windows) {
        &[
            "C:\\Windows\\Fonts\\consola.ttf",
            "C:\\Windows\\Fonts\\lucon.ttf",
            "C:\\Windows\\Fonts\\cour.ttf",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/Monaco.ttf",
            "/System/Library/Fonts/Supplemental/Courier New.ttf",
            "/Library/Fonts/Courier New.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
        ]
    }
}

/// Renders glyph grids onto fresh frame-sized canvases
pub struct Compositor {
    config: RenderConfig,
    typeface: Typeface,
    /// Doubled glyph strings, one per palette index
    doubled: Vec<String>,
    scale: PxScale,
}

impl Compositor {
    pub fn new(config: RenderConfig, typeface: Typeface) -> Self {
        let doubled: Vec<String> = config
            .palette
            .glyphs()
            .iter()
            .map(|&glyph| {
                let mut cell = String::with_capacity(glyph.len_utf8() * 2);
                cell.push(glyph);
                cell.push(glyph);
                cell
            })
            .collect();
        let scale = PxScale::from(config.font_size as f32);
        Self {
            config,
            typeface,
            doubled,
            scale,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `grid` onto a fresh canvas of exactly `width` x `height`.
    ///
    /// The canvas is prefilled with the background color; each cell draws
    /// its doubled glyph in the foreground color at
    /// `(col * cell_width, row * cell_height)`. Same grid and configuration
    /// always produce byte-identical output.
    pub fn composite(&self, grid: &LumaGrid, width: u32, height: u32) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(width, height, self.config.background);
        let levels = self.config.palette.len();
        for row in 0..grid.rows() {
            let y = (row * self.config.cell_height) as i32;
            for col in 0..grid.cols() {
                let index = quantize(grid.sample(row, col), levels);
                let cell = &self.doubled[index];
                // Blank glyphs leave the background untouched.
                if cell.as_bytes()[0] == b' ' {
                    continue;
                }
                let x = (col * self.config.cell_width) as i32;
                draw_text_mut(
                    &mut canvas,
                    self.config.foreground,
                    x,
                    y,
                    self.scale,
                    &self.typeface.font,
                    cell,
                );
            }
        }
        canvas
    }
}
