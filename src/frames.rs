//! Raw frame buffers and luminance downsampling
//!
//! Frames arrive from the decoder as packed RGB24 buffers. Downsampling
//! reduces a frame to one luminance sample per glyph cell using
//! nearest-neighbor sampling; interpolation is deliberately avoided because
//! smoothing across cell boundaries blurs the rendered characters.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgb};

use crate::error::{Error, Result};

/// One decoded video frame: packed RGB24, row-major
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 3);
        Self {
            width,
            height,
            data,
        }
    }

    /// Reduce to a single-channel luminance image.
    fn to_luma(&self) -> GrayImage {
        let mut samples = Vec::with_capacity(self.width as usize * self.height as usize);
        for px in self.data.chunks_exact(3) {
            samples.push(luminance(Rgb([px[0], px[1], px[2]])));
        }
        GrayImage::from_raw(self.width, self.height, samples)
            .expect("luma buffer sized to frame dimensions")
    }
}

/// Rec. 709 luma conversion.
pub fn luminance(rgb: Rgb<u8>) -> u8 {
    let r = rgb[0] as f64;
    let g = rgb[1] as f64;
    let b = rgb[2] as f64;
    (0.2126 * r + 0.7152 * g + 0.0722 * b) as u8
}

/// Per-frame grid of luminance samples, one per glyph cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaGrid {
    rows: u32,
    cols: u32,
    samples: Vec<u8>,
}

impl LumaGrid {
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// The luminance sample at grid position (row, col).
    pub fn sample(&self, row: u32, col: u32) -> u8 {
        self.samples[(row * self.cols + col) as usize]
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

/// Downsample a frame to a `rows` x `cols` luminance grid.
///
/// Fails with [`Error::InvalidDimensions`] when either target dimension is
/// zero, i.e. the frame is smaller than one glyph cell.
pub fn downsample(frame: &RawFrame, rows: u32, cols: u32) -> Result<LumaGrid> {
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: frame.width,
            height: frame.height,
        });
    }
    let luma = frame.to_luma();
    let resized = imageops::resize(&luma, cols, rows, FilterType::Nearest);
    Ok(LumaGrid {
        rows,
        cols,
        samples: resized.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> RawFrame {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        RawFrame::new(width, height, data)
    }

    #[test]
    fn grid_has_requested_dimensions() {
        let frame = solid_frame(640, 480, [90, 90, 90]);
        let grid = downsample(&frame, 32, 40).unwrap();
        assert_eq!(grid.rows(), 32);
        assert_eq!(grid.cols(), 40);
        assert_eq!(grid.samples().len(), 32 * 40);
    }

    #[test]
    fn solid_frame_downsamples_to_solid_grid() {
        let rgb = [200, 40, 90];
        let frame = solid_frame(64, 48, rgb);
        let grid = downsample(&frame, 3, 4).unwrap();
        let expected = luminance(Rgb(rgb));
        assert!(grid.samples().iter().all(|&s| s == expected));
    }

    #[test]
    fn same_size_downsample_keeps_samples() {
        // 2x2 frame with four distinct gray levels
        let data = vec![
            10, 10, 10, 80, 80, 80, //
            160, 160, 160, 240, 240, 240,
        ];
        let frame = RawFrame::new(2, 2, data);
        let grid = downsample(&frame, 2, 2).unwrap();
        let expected: Vec<u8> = [10u8, 80, 160, 240]
            .iter()
            .map(|&v| luminance(Rgb([v, v, v])))
            .collect();
        assert_eq!(grid.samples(), expected.as_slice());
    }

    #[test]
    fn zero_target_is_rejected() {
        let frame = solid_frame(8, 8, [0, 0, 0]);
        match downsample(&frame, 0, 4) {
            Err(Error::InvalidDimensions { width, height }) => {
                assert_eq!((width, height), (8, 8));
            }
            other => panic!("expected InvalidDimensions, got {:?}", other),
        }
    }

    #[test]
    fn luminance_weights_are_rec709() {
        assert_eq!(luminance(Rgb([0, 0, 0])), 0);
        assert_eq!(luminance(Rgb([255, 0, 0])), 54);
        assert_eq!(luminance(Rgb([0, 255, 0])), 182);
        assert_eq!(luminance(Rgb([0, 0, 255])), 18);
        // Green dominates red dominates blue
        assert!(luminance(Rgb([0, 255, 0])) > luminance(Rgb([255, 0, 0])));
        assert!(luminance(Rgb([255, 0, 0])) > luminance(Rgb([0, 0, 255])));
    }
}
