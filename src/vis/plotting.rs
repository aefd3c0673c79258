pub mod gif;
pub mod png;

use plotters::style::{RGBColor, BLUE, CYAN, GREEN, MAGENTA, RED};
use scarlet::colormap::{ColorMap, ListedColorMap};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::trace;

pub const STANDARD_RESOLUTION: (u32, u32) = (1000, 600);
pub const CAPTION_STYLE: (&str, i32) = ("sans-serif", 24);
pub const AXIS_STYLE: (&str, i32) = ("sans-serif", 16);
pub const CHART_MARGIN: u32 = 20;
pub const AXIS_LABEL_AREA: u32 = 60;
pub const HEADER_LINE_HEIGHT: u32 = 26;
pub const X_MARGIN: f64 = 0.02;
pub const Y_MARGIN: f64 = 0.1;
pub const LEGEND_OPACITY: f64 = 0.8;
pub const LEGEND_PATH_LENGTH: i32 = 20;
pub const BAND_OPACITY: f64 = 0.25;
pub const AGENT_RADIUS: i32 = 3;
pub const BEST_RADIUS: i32 = 7;
pub const OPTIMUM_RADIUS: i32 = 12;
pub const OPTIMUM_COLOR: RGBColor = RGBColor(0, 255, 0);
pub const COLORS: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, CYAN];

/// Colour maps available for the contour backdrop.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ColorMapKind {
    #[default]
    Viridis,
    Magma,
    Inferno,
    Plasma,
}

impl ColorMapKind {
    #[must_use]
    pub fn listed(self) -> ListedColorMap {
        match self {
            Self::Viridis => ListedColorMap::viridis(),
            Self::Magma => ListedColorMap::magma(),
            Self::Inferno => ListedColorMap::inferno(),
            Self::Plasma => ListedColorMap::plasma(),
        }
    }

    /// Maps a value in `[0, 1]` to a plotting colour.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_lossless
    )]
    #[must_use]
    pub fn color_at(self, value: f64) -> RGBColor {
        let color: scarlet::color::RGBColor =
            self.listed().transform_single(value.clamp(0.0, 1.0));
        RGBColor(
            (color.r * u8::MAX as f64) as u8,
            (color.g * u8::MAX as f64) as u8,
            (color.b * u8::MAX as f64) as u8,
        )
    }
}

/// Allocates a buffer for storing pixel data for an image of the given width and height.
///
/// The buffer holds 3 bytes per pixel (RGB), the layout `BitMapBackend::with_buffer`
/// draws into and `image::save_buffer_with_format` writes.
#[tracing::instrument(level = "trace")]
pub(crate) fn allocate_buffer(width: u32, height: u32) -> Vec<u8> {
    trace!("Allocating buffer.");
    vec![0; width as usize * height as usize * 3]
}
