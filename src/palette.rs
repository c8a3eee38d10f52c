//! Glyph palettes and luminance quantization
//!
//! A palette is an ordered, non-empty sequence of glyphs from darkest to
//! lightest: index 0 represents the lowest luminance, the last index the
//! highest. Reversing flips that orientation, which is useful when rendering
//! dark ink on a light background.

use crate::error::{Error, Result};

/// 73-glyph ramp from blank to dense ink.
const LONG_RAMP: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczsyeXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// 11-glyph ramp for coarse output.
const SHORT_RAMP: &str = " .<c73xek#■";

/// Named palette presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalettePreset {
    /// 11 glyphs
    Short,
    /// 37 glyphs, every second glyph of the long ramp
    Medium,
    /// 73 glyphs
    Long,
}

/// An ordered glyph ramp used to render luminance buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<char>,
}

impl Palette {
    /// Build a palette from a named preset, optionally reversed.
    pub fn preset(preset: PalettePreset, reverse: bool) -> Self {
        let glyphs: Vec<char> = match preset {
            PalettePreset::Short => SHORT_RAMP.chars().collect(),
            // The medium ramp is the long ramp thinned to every second glyph.
            PalettePreset::Medium => LONG_RAMP.chars().step_by(2).collect(),
            PalettePreset::Long => LONG_RAMP.chars().collect(),
        };
        Self::from_glyphs(glyphs, reverse)
    }

    /// Build a palette from a user-supplied glyph string, optionally reversed.
    ///
    /// Fails with [`Error::Config`] when the string is empty.
    pub fn custom(glyphs: &str, reverse: bool) -> Result<Self> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.is_empty() {
            return Err(Error::config(
                "charset",
                "custom glyph set must contain at least one glyph",
            ));
        }
        Ok(Self::from_glyphs(glyphs, reverse))
    }

    fn from_glyphs(mut glyphs: Vec<char>, reverse: bool) -> Self {
        if reverse {
            glyphs.reverse();
        }
        Self { glyphs }
    }

    /// Number of glyphs in the ramp, always at least 1.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// The glyph for an 8-bit luminance sample.
    pub fn glyph_for(&self, luma: u8) -> char {
        self.glyphs[quantize(luma, self.glyphs.len())]
    }

    /// A copy of this palette with the ramp orientation flipped.
    pub fn reversed(&self) -> Self {
        let mut glyphs = self.glyphs.clone();
        glyphs.reverse();
        Self { glyphs }
    }
}

/// Map an 8-bit luminance sample to a bucket index in `[0, levels - 1]`.
///
/// Uses integer bucketing, `floor(luma * levels / 256)`. The formula cannot
/// reach `levels` for `luma <= 255`, but the result is clamped anyway so the
/// boundary stays total even if the sample type ever widens.
pub fn quantize(luma: u8, levels: usize) -> usize {
    debug_assert!(levels >= 1, "palette cannot be empty");
    let index = (luma as usize * levels) / 256;
    index.min(levels - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_sizes() {
        assert_eq!(Palette::preset(PalettePreset::Short, false).len(), 11);
        assert_eq!(Palette::preset(PalettePreset::Medium, false).len(), 37);
        assert_eq!(Palette::preset(PalettePreset::Long, false).len(), 73);
    }

    #[test]
    fn medium_is_every_second_glyph_of_long() {
        let long = Palette::preset(PalettePreset::Long, false);
        let medium = Palette::preset(PalettePreset::Medium, false);
        let thinned: Vec<char> = long.glyphs().iter().copied().step_by(2).collect();
        assert_eq!(medium.glyphs(), thinned.as_slice());
    }

    #[test]
    fn darkest_glyph_is_blank() {
        for preset in [
            PalettePreset::Short,
            PalettePreset::Medium,
            PalettePreset::Long,
        ] {
            assert_eq!(Palette::preset(preset, false).glyph_for(0), ' ');
        }
    }

    #[test]
    fn reverse_flips_orientation() {
        let plain = Palette::preset(PalettePreset::Long, false);
        let reversed = Palette::preset(PalettePreset::Long, true);
        assert_eq!(reversed.glyph_for(0), '$');
        assert_eq!(reversed.glyph_for(255), ' ');
        assert_eq!(reversed.reversed(), plain);
    }

    #[test]
    fn reversal_is_an_involution() {
        let palette = Palette::custom("abcdef", false).unwrap();
        assert_eq!(palette.reversed().reversed(), palette);
    }

    #[test]
    fn empty_custom_palette_is_rejected() {
        match Palette::custom("", false) {
            Err(Error::Config { field, .. }) => assert_eq!(field, "charset"),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn single_glyph_palette_is_accepted() {
        let palette = Palette::custom("#", true).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.glyph_for(0), '#');
        assert_eq!(palette.glyph_for(255), '#');
    }

    #[test]
    fn quantize_is_monotonic_and_in_bounds() {
        for levels in [1usize, 2, 11, 37, 73, 255, 256] {
            let mut previous = 0usize;
            for luma in 0..=255u8 {
                let index = quantize(luma, levels);
                assert!(index < levels);
                assert!(index >= previous);
                previous = index;
            }
        }
    }

    #[test]
    fn quantize_boundaries() {
        for levels in [1usize, 11, 37, 73] {
            assert_eq!(quantize(0, levels), 0);
            assert_eq!(quantize(255, levels), levels - 1);
        }
    }

    #[test]
    fn quantize_matches_integer_bucketing() {
        assert_eq!(quantize(127, 2), 0);
        assert_eq!(quantize(128, 2), 1);
        assert_eq!(quantize(100, 11), 100 * 11 / 256);
    }
}
