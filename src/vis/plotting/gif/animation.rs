use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use gif::{Encoder, Frame, Repeat};
use tracing::{debug, trace, warn};

use super::{
    GifBundle, DEFAULT_LOOP_PAUSE_MS, DEFAULT_TIME_PER_FRAME_MS, MIN_TIME_PER_FRAME_MS,
    QUANTIZER_SPEED,
};
use crate::core::error::VisError;

/// Encodes PNG frames, in the given order, into an endlessly looping GIF.
///
/// The final frame is repeated `loop_pause_ms / time_per_frame_ms` times so
/// the animation rests on it before starting over.
///
/// Frames are read and appended one at a time into `<path>.part`, which is
/// renamed to `path` once the trailer is written. Any unreadable frame aborts
/// the encode and removes the partial file, so an existing GIF at `path` is
/// left untouched.
///
/// # Errors
///
/// Returns `VisError::NoFrames` for an empty list, `VisError::InvalidConfig`
/// for a frame time below one centisecond, `VisError::FrameMismatch` if
/// frame sizes differ, and any I/O, decoding or encoding error.
#[tracing::instrument(level = "debug", skip(frames))]
pub fn animate_frames<P>(
    frames: &[P],
    path: &Path,
    time_per_frame_ms: Option<u32>,
    loop_pause_ms: Option<u32>,
) -> Result<GifBundle>
where
    P: AsRef<Path>,
{
    debug!("Encoding {} frames.", frames.len());
    let partial = partial_path(path);

    match encode_frames(frames, &partial, time_per_frame_ms, loop_pause_ms) {
        Ok(bundle) => {
            fs::rename(&partial, path).with_context(|| {
                format!("Failed to move '{}' into place", partial.display())
            })?;
            Ok(bundle)
        }
        Err(e) => {
            if partial.is_file() {
                if let Err(remove) = fs::remove_file(&partial) {
                    warn!("Could not remove {}: {remove}", partial.display());
                }
            }
            Err(e)
        }
    }
}

/// Sibling of `path` the GIF is written to before it is complete.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn encode_frames<P>(
    frames: &[P],
    path: &Path,
    time_per_frame_ms: Option<u32>,
    loop_pause_ms: Option<u32>,
) -> Result<GifBundle>
where
    P: AsRef<Path>,
{
    let time_per_frame_ms = time_per_frame_ms.unwrap_or(DEFAULT_TIME_PER_FRAME_MS);
    let loop_pause_ms = loop_pause_ms.unwrap_or(DEFAULT_LOOP_PAUSE_MS);

    if frames.is_empty() {
        return Err(VisError::NoFrames.into());
    }
    if time_per_frame_ms < MIN_TIME_PER_FRAME_MS {
        return Err(VisError::InvalidConfig(format!(
            "time per frame must be at least {MIN_TIME_PER_FRAME_MS} ms, got {time_per_frame_ms}"
        ))
        .into());
    }

    let delay_cs = u16::try_from(time_per_frame_ms / 10).context("Time per frame too long for GIF")?;
    let pause_repeats = (loop_pause_ms / time_per_frame_ms) as usize;

    let mut encoder: Option<Encoder<BufWriter<File>>> = None;
    let mut dimensions = (0, 0);
    let mut last_frame = None;

    for (index, frame_path) in frames.iter().enumerate() {
        let frame_path = frame_path.as_ref();
        trace!("Appending frame {}.", frame_path.display());
        let image = image::open(frame_path)
            .with_context(|| format!("Failed to read frame '{}'", frame_path.display()))?
            .into_rgb8();
        let (width, height) = image.dimensions();

        if encoder.is_none() {
            dimensions = (width, height);
            let file = File::create(path)
                .with_context(|| format!("Failed to create GIF '{}'", path.display()))?;
            let mut new_encoder = Encoder::new(
                BufWriter::new(file),
                u16::try_from(width).context("Frame too wide for GIF")?,
                u16::try_from(height).context("Frame too tall for GIF")?,
                &[],
            )?;
            new_encoder.set_repeat(Repeat::Infinite)?;
            encoder = Some(new_encoder);
        } else if (width, height) != dimensions {
            return Err(VisError::FrameMismatch {
                index,
                expected: dimensions,
                found: (width, height),
            }
            .into());
        }
        let active = encoder.as_mut().ok_or(VisError::NoFrames)?;

        #[allow(clippy::cast_possible_truncation)]
        let mut frame = Frame::from_rgb_speed(
            width as u16,
            height as u16,
            image.as_raw(),
            QUANTIZER_SPEED,
        );
        frame.delay = delay_cs;
        active.write_frame(&frame)?;
        last_frame = Some(frame);
    }

    let mut encoder = encoder.ok_or(VisError::NoFrames)?;
    if let Some(frame) = &last_frame {
        for _ in 0..pause_repeats {
            encoder.write_frame(frame)?;
        }
    }
    // flushes the trailer
    let mut writer = encoder.into_inner()?;
    std::io::Write::flush(&mut writer)?;

    Ok(GifBundle {
        frame_count: frames.len() + pause_repeats,
        width: dimensions.0,
        height: dimensions.1,
        delay_cs,
    })
}
