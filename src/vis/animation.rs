use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::plotting::{
    gif::{animation::animate_frames, GifBundle},
    png::landscape::{landscape_frame_plot, Backdrop},
};
use crate::core::{
    config::animation::Animation,
    data::run_log::{select_iterations, RunLog},
    error::VisError,
};

/// Outcome of a finished animation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationReport {
    /// Number of distinct iterations drawn.
    pub frames_rendered: usize,
    pub gif: GifBundle,
    pub output_path: PathBuf,
}

/// Renders one frame per selected iteration of an agents history and
/// assembles them into a looping GIF.
///
/// The contour backdrop is computed once. Frames are written to
/// `frame_dir` and removed again after encoding unless `keep_frames` is set.
/// On failure, frames written so far stay on disk.
///
/// # Errors
///
/// Returns `VisError::EmptyLog` if the history has no rows, and propagates
/// any loading, rendering or encoding error.
#[tracing::instrument(level = "info", skip(config))]
pub fn run_animation(config: &Animation) -> Result<AnimationReport> {
    info!(
        "Animating {} from {}",
        config.benchmark,
        config.history_path.display()
    );

    let log = RunLog::load(&config.history_path)?;
    if log.is_empty() {
        return Err(VisError::EmptyLog(config.history_path.display().to_string()).into());
    }
    let groups = log.by_iteration();
    let iterations: Vec<u32> = groups.keys().copied().collect();
    let selected = select_iterations(&iterations, config.frame_stride)?;
    debug!(
        "Rendering {} of {} iterations.",
        selected.len(),
        iterations.len()
    );

    let backdrop = Backdrop::new(
        config.benchmark.landscape(),
        config.grid_resolution,
        config.contour_levels,
        config.color_map,
    )?;

    fs::create_dir_all(&config.frame_dir).with_context(|| {
        format!(
            "Failed to create frame directory '{}'",
            config.frame_dir.display()
        )
    })?;

    let mut frames = Vec::with_capacity(selected.len());
    for iteration in &selected {
        let rows = groups
            .get(iteration)
            .ok_or(VisError::EmptyIteration(*iteration))?;
        let path = frame_path(&config.frame_dir, *iteration);
        landscape_frame_plot(
            &backdrop,
            *iteration,
            rows,
            config.show_optimum,
            Some(path.as_path()),
            Some(config.resolution),
        )
        .with_context(|| format!("Failed to render iteration {iteration}"))?;
        frames.push(path);
    }

    if let Some(parent) = config
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    let gif = animate_frames(
        &frames,
        &config.output_path,
        Some(config.frame_duration_ms),
        Some(config.loop_pause_ms),
    )?;

    if config.keep_frames {
        debug!("Keeping frames in {}", config.frame_dir.display());
    } else {
        remove_frames(&frames, &config.frame_dir)?;
    }

    info!(
        "Wrote {} with {} frames",
        config.output_path.display(),
        gif.frame_count
    );
    Ok(AnimationReport {
        frames_rendered: frames.len(),
        gif,
        output_path: config.output_path.clone(),
    })
}

/// Frame file of an iteration. Zero padded so directory listings sort in
/// playback order.
#[must_use]
pub fn frame_path(frame_dir: &Path, iteration: u32) -> PathBuf {
    frame_dir.join(format!("frame_{iteration:06}.png"))
}

/// Deletes the rendered frames and, if nothing else is left, their directory.
#[tracing::instrument(level = "debug", skip(frames))]
fn remove_frames(frames: &[PathBuf], frame_dir: &Path) -> Result<()> {
    debug!("Removing {} frames.", frames.len());
    for frame in frames {
        fs::remove_file(frame)
            .with_context(|| format!("Failed to remove frame '{}'", frame.display()))?;
    }
    let is_empty = fs::read_dir(frame_dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if is_empty {
        if let Err(e) = fs::remove_dir(frame_dir) {
            warn!("Could not remove {}: {e}", frame_dir.display());
        }
    }
    Ok(())
}
