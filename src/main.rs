use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use asciivid::{
    AppConfig, ColorSpec, ConvertOptions, PaletteChoice, PalettePreset, ProgressPhase,
    RenderOptions, VideoConverter,
};
use clap::{Parser, ValueEnum};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

fn load_config() -> Result<AppConfig> {
    // Look for asciivid.json in app support, current dir fallback, then
    // built-in default
    let mut tried: Vec<PathBuf> = Vec::new();
    if let Some(mut d) = dirs::data_dir() {
        d.push("asciivid");
        d.push("asciivid.json");
        tried.push(d);
    }
    tried.push(PathBuf::from("asciivid.json"));

    for p in &tried {
        if p.exists() {
            let text =
                fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            let cfg: AppConfig = serde_json::from_str(&text).context("parsing config json")?;
            return Ok(cfg);
        }
    }

    Ok(AppConfig::default())
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PaletteArg {
    Short,
    Medium,
    Long,
}

impl PaletteArg {
    fn to_preset(self) -> PalettePreset {
        match self {
            PaletteArg::Short => PalettePreset::Short,
            PaletteArg::Medium => PalettePreset::Medium,
            PaletteArg::Long => PalettePreset::Long,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Convert a video into an ASCII-art rendered video.")]
struct Args {
    /// Input video file
    input: PathBuf,

    /// Output video file
    output: PathBuf,

    /// Glyph cell font size in pixels
    #[arg(short = 's', long)]
    font_size: Option<u32>,

    /// Named glyph ramp
    #[arg(short = 'a', long, value_enum)]
    palette: Option<PaletteArg>,

    /// Custom glyph ramp, darkest to lightest (overrides --palette)
    #[arg(short = 'c', long)]
    charset: Option<String>,

    /// Flip the ramp so dark glyphs render bright areas
    #[arg(short, long, default_value_t = false)]
    reverse: bool,

    /// Foreground ink color as R,G,B or #RRGGBB
    #[arg(long)]
    fg: Option<String>,

    /// Background color as R,G,B or #RRGGBB
    #[arg(long)]
    bg: Option<String>,

    /// Monospace font file used to rasterize glyphs
    #[arg(long)]
    font: Option<PathBuf>,

    /// Named preset from the config file
    #[arg(long)]
    preset: Option<String>,

    /// Keep the staged PNG frames and print their location
    #[arg(long, default_value_t = false)]
    keep_frames: bool,

    /// Overwrite the output file without asking
    #[arg(short = 'y', long, default_value_t = false)]
    yes: bool,
}

fn build_render_options(args: &Args, cfg: &AppConfig) -> Result<RenderOptions> {
    let preset_name = args.preset.as_deref().unwrap_or(&cfg.default_preset);
    let preset = cfg
        .preset(preset_name)
        .ok_or_else(|| anyhow!("Missing preset '{}' in config", preset_name))?;
    let mut options = preset.to_options()?;

    if let Some(font_size) = args.font_size {
        options.font_size = font_size;
    }
    if let Some(palette) = args.palette {
        options.palette = PaletteChoice::Preset(palette.to_preset());
    }
    if let Some(charset) = &args.charset {
        options.palette = PaletteChoice::Custom(charset.clone());
    }
    if args.reverse {
        options.reverse = true;
    }
    if let Some(fg) = &args.fg {
        options.foreground = ColorSpec::from_str(fg)?;
    }
    if let Some(bg) = &args.bg {
        options.background = ColorSpec::from_str(bg)?;
    }
    Ok(options)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = load_config()?;

    let render = build_render_options(&args, &cfg)?;
    let options = ConvertOptions {
        render,
        font: args.font.clone(),
        keep_frames: args.keep_frames,
    };

    if args.output.exists() && !args.yes {
        let overwrite = Confirm::new()
            .with_prompt(format!(
                "Output file {} already exists. Overwrite?",
                args.output.display()
            ))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let converter = VideoConverter::with_config(cfg);

    let mut bar: Option<ProgressBar> = None;
    let summary = converter.convert_with_progress(
        &args.input,
        &args.output,
        &options,
        |progress| match progress.phase {
            ProgressPhase::ExtractingAudio => {
                println!("Extracting audio...");
            }
            ProgressPhase::ConvertingFrames => {
                let pb = bar.get_or_insert_with(|| {
                    let pb = ProgressBar::new(progress.total as u64);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                            .unwrap()
                            .progress_chars("#>-"),
                    );
                    pb.set_message("Converting frames");
                    pb
                });
                pb.set_position(progress.completed as u64);
            }
            ProgressPhase::Assembling => {
                if let Some(pb) = bar.take() {
                    pb.finish_with_message("Frames converted");
                }
                println!("Assembling video...");
            }
            ProgressPhase::Complete => {}
        },
    )?;

    println!(
        "\nASCII video written to {} ({} frames @ {:.2} fps{})",
        args.output.display(),
        summary.frames,
        summary.fps,
        if summary.audio {
            ", audio carried over"
        } else {
            ", no audio track"
        }
    );
    if let Some(frames_dir) = &summary.frames_dir {
        println!("Staged frames kept in {}", frames_dir.display());
    }

    Ok(())
}
