//! Example: convert a video to ASCII art using asciivid as a library
//!
//! Run with: cargo run --example convert_video

use asciivid::{ConvertOptions, VideoConverter};
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
    let options = ConvertOptions::default();

    println!("Converting video to ASCII...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    let summary = converter.convert(input, output, &options)?;

    println!("✓ Conversion complete!");
    println!(
        "{} frames at {:.2} fps{}",
        summary.frames,
        summary.fps,
        if summary.audio { ", with audio" } else { "" }
    );

    Ok(())
}
