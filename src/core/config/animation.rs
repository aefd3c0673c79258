use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{core::landscape::Benchmark, vis::plotting::ColorMapKind};

/// Parameters of the animated landscape GIF.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct Animation {
    pub benchmark: Benchmark,
    pub history_path: PathBuf,
    pub output_path: PathBuf,
    /// Directory receiving the temporary per-iteration frames.
    pub frame_dir: PathBuf,
    pub frame_duration_ms: u32,
    /// Time the final frame stays on screen before the loop restarts.
    pub loop_pause_ms: u32,
    pub grid_resolution: usize,
    pub contour_levels: usize,
    pub color_map: ColorMapKind,
    /// Render every Nth iteration. The last iteration is always rendered.
    pub frame_stride: usize,
    pub resolution: (u32, u32),
    pub show_optimum: bool,
    pub keep_frames: bool,
}

impl Default for Animation {
    #[tracing::instrument(level = "debug")]
    fn default() -> Self {
        debug!("Creating default animation config");
        Self {
            benchmark: Benchmark::Eggholder,
            history_path: PathBuf::from("results/history.csv"),
            output_path: PathBuf::from("agent_movement.gif"),
            frame_dir: PathBuf::from("frames"),
            frame_duration_ms: 200,
            loop_pause_ms: 5000,
            grid_resolution: 400,
            contour_levels: 30,
            color_map: ColorMapKind::Viridis,
            frame_stride: 1,
            resolution: (1000, 600),
            show_optimum: true,
            keep_frames: false,
        }
    }
}
