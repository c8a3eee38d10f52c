//! Example: follow detailed conversion progress
//!
//! Run with: cargo run --example watch_progress

use asciivid::{ConvertOptions, PaletteChoice, PalettePreset, ProgressPhase, VideoConverter};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = Path::new("demo_media/clip.mp4");
    let output = Path::new("clip_ascii.mp4");

    if !input.exists() {
        println!("Note: {} not found.", input.display());
        println!("To use this example, provide a video file at that path.");
        return Ok(());
    }

    let converter = VideoConverter::new();
    let mut options = ConvertOptions::default();
    options.render.palette = PaletteChoice::Preset(PalettePreset::Long);
    options.render.font_size = 10;

    converter.convert_with_progress(input, output, &options, |progress| {
        match progress.phase {
            ProgressPhase::ExtractingAudio => println!("Extracting audio..."),
            ProgressPhase::ConvertingFrames => {
                println!(
                    "Converting: {}/{} ({:.1}%)",
                    progress.completed, progress.total, progress.percentage
                );
            }
            ProgressPhase::Assembling => println!("Assembling video..."),
            ProgressPhase::Complete => println!("Done!"),
        }
    })?;

    Ok(())
}
