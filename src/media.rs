//! External media collaborators: probing, decoding, audio, and assembly
//!
//! Everything in this module shells out to `ffprobe`/`ffmpeg`; the rest of
//! the crate only sees raw RGB24 frames coming in and staged PNG frames
//! going out.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::frames::RawFrame;
use crate::sequence::{FrameNamer, FRAME_PREFIX};

/// Probed properties of the source video stream
#[derive(Debug, Clone)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    /// Total frames reported by the container
    pub frame_count: usize,
    /// Frame rate as a float, for display and summaries
    pub fps: f64,
    /// Frame rate as ffprobe reported it (e.g. `30000/1001`), passed to the
    /// encoder verbatim so the output rate is exact
    pub fps_rational: String,
}

/// An opened video source with probed metadata
#[derive(Debug)]
pub struct VideoSource {
    path: PathBuf,
    meta: VideoMeta,
}

impl VideoSource {
    /// Open and probe a source file.
    ///
    /// A missing path, a file ffprobe cannot open, or a container reporting
    /// zero frames all fail with [`Error::SourceNotFound`] before any output
    /// storage is touched.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let fields = probe_fields(
            path,
            &["-show_entries", "stream=width,height,r_frame_rate,nb_frames"],
        )
        .map_err(|e| e.into_open_error(path))?;

        let width = positive_field(&fields, "width")
            .ok_or_else(|| Error::decode(path, "stream reports no width"))?;
        let height = positive_field(&fields, "height")
            .ok_or_else(|| Error::decode(path, "stream reports no height"))?;
        let (fps_rational, fps) = fields
            .get("r_frame_rate")
            .and_then(|text| parse_rational(text))
            .ok_or_else(|| Error::decode(path, "stream reports no usable frame rate"))?;

        // Some containers omit nb_frames; counting packets is slower but
        // exact.
        let frame_count = match fields.get("nb_frames").and_then(|v| v.parse::<usize>().ok()) {
            Some(count) => count,
            None => {
                let fields = probe_fields(
                    path,
                    &["-count_packets", "-show_entries", "stream=nb_read_packets"],
                )
                .map_err(|e| e.into_open_error(path))?;
                fields
                    .get("nb_read_packets")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0)
            }
        };

        if frame_count == 0 {
            return Err(Error::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            meta: VideoMeta {
                width,
                height,
                frame_count,
                fps,
                fps_rational,
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta(&self) -> &VideoMeta {
        &self.meta
    }

    /// Start decoding and return the lazy frame sequence.
    ///
    /// The stream yields frames in container order and is not restartable;
    /// reopen the source to decode again.
    pub fn frames(&self) -> Result<FrameStream> {
        FrameStream::spawn(&self.path, self.meta.width, self.meta.height)
    }
}

/// Lazy sequence of raw frames fed by an ffmpeg child process
pub struct FrameStream {
    path: PathBuf,
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    frame_len: usize,
    finished: bool,
}

impl FrameStream {
    fn spawn(path: &Path, width: u32, height: u32) -> Result<Self> {
        let mut child = Command::new("ffmpeg")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(path)
            .arg("-map")
            .arg("0:v:0")
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::decode(path, format!("failed to run ffmpeg: {}", e)))?;
        let stdout = child
            .stdout
            .take()
            .expect("ffmpeg stdout requested as a pipe");
        Ok(Self {
            path: path.to_path_buf(),
            child,
            stdout,
            width,
            height,
            frame_len: width as usize * height as usize * 3,
            finished: false,
        })
    }
}

impl Iterator for FrameStream {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut data = vec![0u8; self.frame_len];
        let mut filled = 0usize;
        while filled < data.len() {
            match self.stdout.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(Error::decode(
                        &self.path,
                        format!("reading frame stream: {}", e),
                    )));
                }
            }
        }

        if filled == 0 {
            // Clean end of stream; a failed decode still ends the pipe, so
            // check how the child exited.
            self.finished = true;
            return match self.child.wait() {
                Ok(status) if status.success() => None,
                Ok(status) => Some(Err(Error::decode(
                    &self.path,
                    format!("ffmpeg exited with {}", status),
                ))),
                Err(e) => Some(Err(Error::decode(
                    &self.path,
                    format!("waiting for ffmpeg: {}", e),
                ))),
            };
        }

        if filled < data.len() {
            self.finished = true;
            return Some(Err(Error::decode(
                &self.path,
                "truncated frame at end of stream",
            )));
        }

        Some(Ok(RawFrame::new(self.width, self.height, data)))
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// Whether the source carries at least one audio stream.
pub fn has_audio(path: &Path) -> Result<bool> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("a")
        .arg("-show_entries")
        .arg("stream=index")
        .arg("-of")
        .arg("csv=p=0")
        .arg(path)
        .output()
        .map_err(|e| Error::decode(path, format!("failed to run ffprobe: {}", e)))?;
    if !output.status.success() {
        return Err(Error::decode(
            path,
            format!("ffprobe exited with {}", output.status),
        ));
    }
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Extract the audio track to an MP3 next to the staged frames.
///
/// Only called when [`has_audio`] reported a track; failure is surfaced as
/// [`Error::AudioExtraction`] rather than silently dropping the audio.
pub fn extract_audio(path: &Path, work_dir: &Path) -> Result<PathBuf> {
    let out_audio = work_dir.join("audio.mp3");
    let status = Command::new("ffmpeg")
        .arg("-loglevel")
        .arg("error")
        .arg("-y")
        .arg("-i")
        .arg(path)
        .arg("-vn")
        .arg("-acodec")
        .arg("libmp3lame")
        .arg("-q:a")
        .arg("2")
        .arg(&out_audio)
        .status()
        .map_err(|e| Error::AudioExtraction {
            path: path.to_path_buf(),
            reason: format!("failed to run ffmpeg: {}", e),
        })?;
    if !status.success() {
        return Err(Error::AudioExtraction {
            path: path.to_path_buf(),
            reason: format!("ffmpeg exited with {}", status),
        });
    }
    Ok(out_audio)
}

/// Number of staged frame images in a directory.
pub fn staged_frame_count(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(FRAME_PREFIX) && name.ends_with(".png"))
        })
        .count()
}

/// Assemble the staged frames (and optional audio) into the output video.
pub fn assemble(
    frames_dir: &Path,
    namer: &FrameNamer,
    fps: &str,
    audio: Option<&Path>,
    output: &Path,
) -> Result<()> {
    if staged_frame_count(frames_dir) == 0 {
        return Err(Error::Mux {
            path: output.to_path_buf(),
            reason: "no staged frames to assemble".to_string(),
        });
    }

    let pattern = frames_dir.join(namer.encoder_pattern());
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-loglevel")
        .arg("error")
        .arg("-y")
        .arg("-framerate")
        .arg(fps)
        .arg("-start_number")
        .arg("0")
        .arg("-i")
        .arg(&pattern);
    if let Some(audio) = audio {
        cmd.arg("-i").arg(audio);
    }
    cmd.arg("-c:v").arg("libx264").arg("-pix_fmt").arg("yuv420p");
    if audio.is_some() {
        cmd.arg("-c:a").arg("aac").arg("-shortest");
    }
    cmd.arg(output);

    let status = cmd.status().map_err(|e| Error::Mux {
        path: output.to_path_buf(),
        reason: format!("failed to run ffmpeg: {}", e),
    })?;
    if !status.success() {
        return Err(Error::Mux {
            path: output.to_path_buf(),
            reason: format!("ffmpeg exited with {}", status),
        });
    }
    Ok(())
}

enum ProbeError {
    Launch(std::io::Error),
    Failed(ExitStatus),
}

impl ProbeError {
    /// During open, a probe the tool itself could run but that rejected the
    /// file means the source is unreadable as a video.
    fn into_open_error(self, path: &Path) -> Error {
        match self {
            ProbeError::Launch(e) => Error::decode(path, format!("failed to run ffprobe: {}", e)),
            ProbeError::Failed(_) => Error::SourceNotFound {
                path: path.to_path_buf(),
            },
        }
    }
}

fn probe_fields(
    path: &Path,
    extra: &[&str],
) -> std::result::Result<HashMap<String, String>, ProbeError> {
    let mut cmd = Command::new("ffprobe");
    cmd.arg("-v").arg("error").arg("-select_streams").arg("v:0");
    for arg in extra {
        cmd.arg(arg);
    }
    cmd.arg("-of").arg("default=noprint_wrappers=1").arg(path);

    let output = cmd.output().map_err(ProbeError::Launch)?;
    if !output.status.success() {
        return Err(ProbeError::Failed(output.status));
    }

    let mut fields = HashMap::new();
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        if let Some((key, value)) = line.split_once('=') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(fields)
}

fn positive_field(fields: &HashMap<String, String>, key: &str) -> Option<u32> {
    fields
        .get(key)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
}

fn parse_rational(text: &str) -> Option<(String, f64)> {
    let text = text.trim();
    let value = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => text.parse().ok()?,
    };
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some((text.to_string(), value))
}
