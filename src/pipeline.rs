//! The per-frame conversion loop
//!
//! Frames are pulled, downsampled, composited, and PNG-encoded strictly in
//! decoder order on the calling thread. Only the final disk write overlaps
//! with the next frame: encoded bytes are handed to a single background
//! writer over a bounded queue. Each job carries the sequence name assigned
//! before the write is issued, so write completion order cannot affect
//! reconstruction order.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use image::ImageFormat;

use crate::compose::Compositor;
use crate::error::{Error, Result};
use crate::frames::{downsample, RawFrame};
use crate::media::VideoMeta;
use crate::sequence::FrameNamer;

/// Encoded frames allowed in flight between the loop and the writer.
const WRITE_QUEUE_DEPTH: usize = 4;

struct WriteJob {
    index: usize,
    path: PathBuf,
    bytes: Vec<u8>,
}

/// Render every frame of `frames` into `frames_dir`.
///
/// Reports monotonic `(processed, total)` progress after each frame is
/// handed off for persistence. Any error aborts the remaining loop and is
/// propagated; a write error reported by the background writer wins only
/// when the loop itself finished cleanly.
pub(crate) fn render_frames<I, F>(
    frames: I,
    meta: &VideoMeta,
    compositor: &Compositor,
    frames_dir: &Path,
    mut progress: F,
) -> Result<FrameNamer>
where
    I: Iterator<Item = Result<RawFrame>>,
    F: FnMut(usize, usize),
{
    let (rows, cols) = compositor.config().grid_for(meta.width, meta.height)?;
    let namer = FrameNamer::new(meta.frame_count);

    let (tx, rx) = mpsc::sync_channel::<WriteJob>(WRITE_QUEUE_DEPTH);
    let writer = thread::spawn(move || -> Result<()> {
        for job in rx {
            fs::write(&job.path, &job.bytes).map_err(|source| Error::Persistence {
                index: job.index,
                path: job.path.clone(),
                source,
            })?;
        }
        Ok(())
    });

    let loop_result = (|| -> Result<()> {
        let mut processed = 0usize;
        for (index, frame) in frames.enumerate() {
            let frame = frame?;
            let grid = downsample(&frame, rows, cols)?;
            let image = compositor.composite(&grid, meta.width, meta.height);

            let path = frames_dir.join(namer.file_name(index));
            let mut bytes = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| Error::Persistence {
                    index,
                    path: path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, e),
                })?;

            if tx.send(WriteJob { index, path, bytes }).is_err() {
                // Writer bailed out; its error is picked up at join below.
                break;
            }

            processed += 1;
            progress(processed, meta.frame_count);
        }
        Ok(())
    })();

    drop(tx);
    let writer_result = writer.join().expect("frame writer thread panicked");

    loop_result?;
    writer_result?;
    Ok(namer)
}
