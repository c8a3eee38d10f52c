//! Integration tests for the public conversion API
//!
//! End-to-end video runs need ffmpeg and real media, so these tests cover
//! the eager-validation contract: bad configuration and missing sources are
//! rejected before any output artifact exists.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use asciivid::{
    ColorSpec, ConvertOptions, Error, FrameNamer, PaletteChoice, RenderOptions, VideoConverter,
};

fn scratch_output(tag: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("asciivid_it_{}_{}.mp4", tag, stamp))
}

#[test]
fn missing_source_creates_no_artifacts() {
    let converter = VideoConverter::new();
    let output = scratch_output("missing");
    let result = converter.convert(
        Path::new("/nonexistent/file.mp4"),
        &output,
        &ConvertOptions::default(),
    );

    match result {
        Err(Error::SourceNotFound { path }) => {
            assert_eq!(path, Path::new("/nonexistent/file.mp4"));
        }
        other => panic!("expected SourceNotFound, got {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn out_of_range_color_is_rejected_before_the_source_is_touched() {
    let converter = VideoConverter::new();
    let output = scratch_output("color");
    let options = ConvertOptions {
        render: RenderOptions {
            foreground: ColorSpec::Rgb(256, 0, 0),
            ..RenderOptions::default()
        },
        ..ConvertOptions::default()
    };

    // The input does not exist either; configuration must win.
    let result = converter.convert(Path::new("/nonexistent/file.mp4"), &output, &options);
    match result {
        Err(Error::Config { field, .. }) => assert_eq!(field, "foreground"),
        other => panic!("expected Config error, got {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn empty_custom_palette_is_rejected() {
    let converter = VideoConverter::new();
    let output = scratch_output("palette");
    let options = ConvertOptions {
        render: RenderOptions {
            palette: PaletteChoice::Custom(String::new()),
            ..RenderOptions::default()
        },
        ..ConvertOptions::default()
    };

    let result = converter.convert(Path::new("/nonexistent/file.mp4"), &output, &options);
    assert!(matches!(result, Err(Error::Config { field: "charset", .. })));
    assert!(!output.exists());
}

#[test]
fn zero_font_size_is_rejected() {
    let converter = VideoConverter::new();
    let output = scratch_output("fontsize");
    let options = ConvertOptions {
        render: RenderOptions {
            font_size: 0,
            ..RenderOptions::default()
        },
        ..ConvertOptions::default()
    };

    let result = converter.convert(Path::new("/nonexistent/file.mp4"), &output, &options);
    assert!(matches!(result, Err(Error::Config { field: "font-size", .. })));
    assert!(!output.exists());
}

#[test]
fn sequence_names_sort_like_time() {
    let namer = FrameNamer::new(1000);
    assert_eq!(namer.name(7), "fr0007");
    assert_eq!(namer.name(999), "fr0999");
    assert_eq!(FrameNamer::new(1).name(0), "fr0");

    let mut names: Vec<String> = (0..1000).map(|i| namer.name(i)).collect();
    let temporal = names.clone();
    names.sort();
    assert_eq!(names, temporal);
}

#[test]
fn unknown_config_preset_is_rejected() {
    let converter = VideoConverter::new();
    match converter.options_from_preset("does-not-exist") {
        Err(Error::Config { field, .. }) => assert_eq!(field, "preset"),
        other => panic!("expected Config error, got {:?}", other),
    }
}
