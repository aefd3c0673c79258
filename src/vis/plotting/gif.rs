pub mod animation;

pub const DEFAULT_TIME_PER_FRAME_MS: u32 = 200;
pub const DEFAULT_LOOP_PAUSE_MS: u32 = 5000;
/// Smallest delay a GIF can express, one centisecond.
pub const MIN_TIME_PER_FRAME_MS: u32 = 10;
/// `NeuQuant` sampling speed, 1 is best quality and 30 fastest.
pub const QUANTIZER_SPEED: i32 = 10;

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifBundle {
    /// Frames written, including repetitions of the final frame.
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
    pub delay_cs: u16,
}
