//! # asciivid - ASCII video converter
//!
//! `asciivid` converts a video file into a new video in which every frame is
//! re-rendered as monospaced ASCII art, preserving the original frame rate
//! and audio track.
//!
//! ## Features
//!
//! - Fixed glyph ramps in three sizes, custom ramps, and ramp reversal
//! - Configurable glyph cell size and foreground/background colors
//! - Lazy frame-by-frame decoding through ffmpeg
//! - Overlapped frame persistence with strict output ordering
//! - Progress reporting for integration with UI applications
//!
//! ## Example
//!
//! ```no_run
//! use asciivid::{ConvertOptions, VideoConverter};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = VideoConverter::new();
//! let options = ConvertOptions::default();
//! let summary = converter.convert(
//!     Path::new("input.mp4"),
//!     Path::new("output.mp4"),
//!     &options,
//! )?;
//! println!("{} frames at {:.2} fps", summary.frames, summary.fps);
//! # Ok(())
//! # }
//! ```
//!
//! ## Progress reporting
//!
//! ```no_run
//! use asciivid::{ConvertOptions, Progress, ProgressPhase, VideoConverter};
//! use std::path::Path;
//!
//! let converter = VideoConverter::new();
//! let options = ConvertOptions::default();
//!
//! converter.convert_with_progress(
//!     Path::new("input.mp4"),
//!     Path::new("output.mp4"),
//!     &options,
//!     |progress| match progress.phase {
//!         ProgressPhase::ExtractingAudio => println!("Extracting audio..."),
//!         ProgressPhase::ConvertingFrames => {
//!             println!("Converting: {}/{} ({:.1}%)",
//!                 progress.completed, progress.total, progress.percentage);
//!         }
//!         ProgressPhase::Assembling => println!("Assembling video..."),
//!         ProgressPhase::Complete => println!("Done!"),
//!     },
//! ).unwrap();
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub mod compose;
pub mod config;
pub mod error;
pub mod frames;
pub mod media;
pub mod palette;
mod pipeline;
pub mod sequence;

pub use compose::{Compositor, Typeface};
pub use config::{AppConfig, ColorSpec, PaletteChoice, Preset, RenderConfig, RenderOptions};
pub use error::{Error, Result};
pub use frames::{downsample, luminance, LumaGrid, RawFrame};
pub use media::{VideoMeta, VideoSource};
pub use palette::{quantize, Palette, PalettePreset};
pub use sequence::FrameNamer;

/// Represents the current phase of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressPhase {
    /// Extracting the audio track from the source
    ExtractingAudio,
    /// Rendering frames to ASCII art
    ConvertingFrames,
    /// Assembling the staged frames into the output video
    Assembling,
    /// Conversion completed successfully
    Complete,
}

/// Progress information for conversion operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Current phase of the conversion
    pub phase: ProgressPhase,
    /// Frames completed in the current phase
    pub completed: usize,
    /// Total frames in the current phase (0 if indeterminate)
    pub total: usize,
    /// Percentage complete (0.0 to 100.0)
    pub percentage: f64,
    /// Human-readable status message
    pub message: String,
}

impl Progress {
    pub fn extracting_audio() -> Self {
        Self {
            phase: ProgressPhase::ExtractingAudio,
            completed: 0,
            total: 0,
            percentage: 0.0,
            message: "Extracting audio from video...".to_string(),
        }
    }

    pub fn converting_frames(completed: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            (completed as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            phase: ProgressPhase::ConvertingFrames,
            completed,
            total,
            percentage,
            message: format!("Converting frame {} of {}", completed, total),
        }
    }

    pub fn assembling() -> Self {
        Self {
            phase: ProgressPhase::Assembling,
            completed: 0,
            total: 0,
            percentage: 0.0,
            message: "Assembling output video...".to_string(),
        }
    }

    pub fn complete(total_frames: usize) -> Self {
        Self {
            phase: ProgressPhase::Complete,
            completed: total_frames,
            total: total_frames,
            percentage: 100.0,
            message: format!("Conversion complete: {} frames", total_frames),
        }
    }
}

/// Per-run options beyond the render configuration
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Render settings, validated before the run starts
    pub render: RenderOptions,
    /// Explicit font file; otherwise a platform monospace face is searched
    pub font: Option<PathBuf>,
    /// Keep the staged PNG frames instead of deleting them with the run
    pub keep_frames: bool,
}

/// What a finished conversion produced
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// Frames reported by the source and used for naming/progress
    pub frames: usize,
    /// Output frame rate
    pub fps: f64,
    /// Whether an audio track was carried over
    pub audio: bool,
    /// Location of the staged frames when they were kept
    pub frames_dir: Option<PathBuf>,
}

/// Staging directory for one run, removed on drop unless kept
struct WorkDir {
    path: PathBuf,
    keep: bool,
}

impl WorkDir {
    fn create() -> Result<Self> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("asciivid_{}_{}", std::process::id(), stamp));
        let frames = path.join("frames");
        fs::create_dir_all(&frames).map_err(|source| Error::Staging {
            path: frames.clone(),
            source,
        })?;
        Ok(Self { path, keep: false })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn frames_dir(&self) -> PathBuf {
        self.path.join("frames")
    }

    fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if !self.keep {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

/// Main converter for turning videos into ASCII-art videos
pub struct VideoConverter {
    config: AppConfig,
}

impl VideoConverter {
    /// Create a converter with the built-in configuration.
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Create a converter with a custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Render options from a named configuration preset.
    pub fn options_from_preset(&self, name: &str) -> Result<RenderOptions> {
        let preset = self
            .config
            .preset(name)
            .ok_or_else(|| Error::config("preset", format!("preset '{}' not found", name)))?;
        preset.to_options()
    }

    /// Convert a video into an ASCII-art rendered video.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
    ) -> Result<ConversionSummary> {
        self.convert_with_progress(input, output, options, |_| {})
    }

    /// Convert a video, reporting progress through a callback.
    ///
    /// Validation is eager: render configuration and source existence are
    /// checked before any staging storage is allocated, and the first error
    /// aborts the run with no partial output video.
    pub fn convert_with_progress<F>(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
        mut progress: F,
    ) -> Result<ConversionSummary>
    where
        F: FnMut(Progress),
    {
        let render_config = options.render.validate()?;

        let source = VideoSource::open(input)?;
        let meta = source.meta().clone();
        // Geometry depends only on probed dimensions; reject impossible
        // runs before the staging directory exists.
        render_config.grid_for(meta.width, meta.height)?;

        let typeface = match &options.font {
            Some(path) => Typeface::load(path)?,
            None => Typeface::discover()?,
        };
        let compositor = Compositor::new(render_config, typeface);

        let mut work_dir = WorkDir::create()?;
        let frames_dir = work_dir.frames_dir();

        // Audio first, as the original pipeline ordered it; a present but
        // unextractable track fails the run instead of going silent.
        let audio = if media::has_audio(input)? {
            progress(Progress::extracting_audio());
            Some(media::extract_audio(input, work_dir.path())?)
        } else {
            None
        };

        progress(Progress::converting_frames(0, meta.frame_count));
        let namer = pipeline::render_frames(
            source.frames()?,
            &meta,
            &compositor,
            &frames_dir,
            |completed, total| progress(Progress::converting_frames(completed, total)),
        )?;

        progress(Progress::assembling());
        media::assemble(
            &frames_dir,
            &namer,
            &meta.fps_rational,
            audio.as_deref(),
            output,
        )?;

        if options.keep_frames {
            work_dir.keep();
        }
        progress(Progress::complete(meta.frame_count));

        Ok(ConversionSummary {
            frames: meta.frame_count,
            fps: meta.fps,
            audio: audio.is_some(),
            frames_dir: options.keep_frames.then_some(frames_dir),
        })
    }
}

impl Default for VideoConverter {
    fn default() -> Self {
        Self::new()
    }
}
