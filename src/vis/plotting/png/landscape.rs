use std::{
    f64::consts::{FRAC_PI_2, PI},
    path::Path,
};

use anyhow::{Context, Result};
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use tracing::trace;

use super::PngBundle;
use crate::{
    core::{
        data::run_log::{best_record, RunRecord},
        error::VisError,
        landscape::{
            contour::{contour_lines, ContourLine},
            Landscape,
        },
    },
    vis::plotting::{
        allocate_buffer, ColorMapKind, AGENT_RADIUS, AXIS_LABEL_AREA, AXIS_STYLE, BEST_RADIUS,
        CAPTION_STYLE, CHART_MARGIN, HEADER_LINE_HEIGHT, OPTIMUM_COLOR, OPTIMUM_RADIUS,
        STANDARD_RESOLUTION,
    },
};

/// Static part of every animation frame: the contour lines of a landscape.
///
/// Computed once per animation and shared by all frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub landscape: Landscape,
    pub contours: Vec<ContourLine>,
    pub color_map: ColorMapKind,
}

impl Backdrop {
    /// Samples the landscape and extracts its contour lines.
    ///
    /// # Errors
    ///
    /// Returns an error for a grid resolution below two or zero levels.
    #[tracing::instrument(level = "debug")]
    pub fn new(
        landscape: Landscape,
        grid_resolution: usize,
        levels: usize,
        color_map: ColorMapKind,
    ) -> Result<Self> {
        let surface = landscape.surface(grid_resolution)?;
        let contours = contour_lines(&surface, levels)?;
        Ok(Self {
            landscape,
            contours,
            color_map,
        })
    }

    /// Colour of a contour line, scaled over the extracted levels.
    fn level_color(&self, level: f64) -> RGBColor {
        let (first, last) = match (self.contours.first(), self.contours.last()) {
            (Some(first), Some(last)) => (first.level, last.level),
            _ => return self.color_map.color_at(0.5),
        };
        if last - first <= f64::EPSILON {
            return self.color_map.color_at(0.5);
        }
        self.color_map.color_at((level - first) / (last - first))
    }
}

/// Renders one animation frame.
///
/// Draws the contour backdrop, the known optimum (optional), all agents of
/// the iteration and highlights the best agent. The header names the
/// benchmark, the iteration with its best value and the ground truth.
///
/// Agents outside the landscape domain, or with non-finite positions, are
/// clipped from the chart. The header still reports the true best.
///
/// Saves the frame to the optionally provided path as a PNG,
/// returns the raw pixel buffer.
///
/// # Errors
///
/// Returns `VisError::EmptyIteration` if `rows` is empty, or any
/// plotting/encoding error.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
#[tracing::instrument(level = "trace", skip(backdrop, rows))]
pub fn landscape_frame_plot(
    backdrop: &Backdrop,
    iteration: u32,
    rows: &[RunRecord],
    show_optimum: bool,
    path: Option<&Path>,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle> {
    trace!("Generating landscape frame.");

    let best = best_record(iteration, rows)?;
    let (width, height) = resolution.unwrap_or(STANDARD_RESOLUTION);
    let header_height = 3 * HEADER_LINE_HEIGHT + CHART_MARGIN;
    if width == 0 || height <= header_height {
        return Err(VisError::InvalidConfig(format!(
            "frame resolution {width}x{height} leaves no room for the chart"
        ))
        .into());
    }

    let landscape = &backdrop.landscape;
    let header = [
        landscape.name(),
        format!(
            "Iteration {iteration}, Best: f({:.4}, {:.4})={:.4}",
            best.x0, best.x1, best.fitness
        ),
        format!("Ground Truth: {}", landscape.ground_truth()),
    ];

    let mut buffer = allocate_buffer(width, height);

    {
        let root = BitMapBackend::with_buffer(&mut buffer[..], (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (header_area, chart_area) = root.split_vertically(header_height);
        let header_style =
            TextStyle::from(CAPTION_STYLE.into_font()).pos(Pos::new(HPos::Center, VPos::Top));
        for (line_index, line) in header.iter().enumerate() {
            header_area.draw(&Text::new(
                line.as_str(),
                (
                    (width / 2) as i32,
                    (CHART_MARGIN / 2 + line_index as u32 * HEADER_LINE_HEIGHT) as i32,
                ),
                header_style.clone(),
            ))?;
        }

        let mut chart = ChartBuilder::on(&chart_area)
            .margin(CHART_MARGIN)
            .x_label_area_size(AXIS_LABEL_AREA)
            .y_label_area_size(AXIS_LABEL_AREA)
            .build_cartesian_2d(
                landscape.x_range.0..landscape.x_range.1,
                landscape.y_range.0..landscape.y_range.1,
            )?;

        chart
            .configure_mesh()
            .x_desc("x0")
            .x_label_style(AXIS_STYLE.into_font())
            .y_desc("x1")
            .y_label_style(AXIS_STYLE.into_font())
            .draw()?;

        for line in &backdrop.contours {
            let color = backdrop.level_color(line.level);
            chart.draw_series(
                line.segments
                    .iter()
                    .map(|&(a, b)| PathElement::new(vec![a, b], color.stroke_width(1))),
            )?;
        }

        if show_optimum {
            chart.draw_series(std::iter::once(
                EmptyElement::at(landscape.optimum)
                    + Polygon::new(star_points(OPTIMUM_RADIUS), OPTIMUM_COLOR.filled()),
            ))?;
        }

        // points outside the domain would overflow the pixel mapping
        let visible: Vec<&RunRecord> = rows
            .iter()
            .filter(|row| within_domain(landscape, row.x0, row.x1))
            .collect();
        if visible.len() < rows.len() {
            trace!(
                "Clipped {} agents outside the domain.",
                rows.len() - visible.len()
            );
        }

        chart.draw_series(
            visible
                .iter()
                .map(|row| Circle::new((row.x0, row.x1), AGENT_RADIUS, RED.filled())),
        )?;

        if within_domain(landscape, best.x0, best.x1) {
            chart.draw_series(std::iter::once(Circle::new(
                (best.x0, best.x1),
                BEST_RADIUS,
                BLACK.stroke_width(2),
            )))?;
        }

        root.present()?;
    } // dropping bitmap backend

    if let Some(path) = path {
        image::save_buffer_with_format(
            path,
            &buffer,
            width,
            height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("Failed to save frame '{}'", path.display()))?;
    }

    Ok(PngBundle {
        data: buffer,
        width,
        height,
    })
}

/// Finite and inside the plotted axes, bounds included.
fn within_domain(landscape: &Landscape, x: f64, y: f64) -> bool {
    let (x_min, x_max) = landscape.x_range;
    let (y_min, y_max) = landscape.y_range;
    (x_min..=x_max).contains(&x) && (y_min..=y_max).contains(&y)
}

/// Five pointed star around the origin in pixel offsets, tip pointing up.
#[allow(clippy::cast_possible_truncation)]
fn star_points(radius: i32) -> Vec<(i32, i32)> {
    (0..10)
        .map(|vertex| {
            let r = if vertex % 2 == 0 {
                f64::from(radius)
            } else {
                f64::from(radius) * 0.4
            };
            let angle = PI * f64::from(vertex) / 5.0 - FRAC_PI_2;
            (
                (r * angle.cos()).round() as i32,
                (r * angle.sin()).round() as i32,
            )
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;
    use crate::{
        core::landscape::Benchmark,
        tests::{clean_files, setup_folder},
    };

    const COMMON_PATH: &str = "tests/vis/plotting/png/landscape";

    fn rows() -> Vec<RunRecord> {
        vec![
            RunRecord {
                iteration: 4,
                agent_id: Some(0),
                fitness: 12.0,
                x0: -2.0,
                x1: 1.0,
            },
            RunRecord {
                iteration: 4,
                agent_id: Some(1),
                fitness: 0.5,
                x0: 1.5,
                x1: 2.5,
            },
        ]
    }

    fn backdrop() -> Backdrop {
        Backdrop::new(Benchmark::Booth.landscape(), 50, 10, ColorMapKind::Viridis).unwrap()
    }

    #[test]
    fn test_landscape_frame_plot() -> Result<()> {
        let path = Path::new(COMMON_PATH);
        setup_folder(path)?;
        let files = vec![path.join("booth_frame.png")];
        clean_files(&files)?;

        let bundle = landscape_frame_plot(
            &backdrop(),
            4,
            &rows(),
            true,
            Some(files[0].as_path()),
            None,
        )?;

        assert!(files[0].is_file());
        assert_eq!(bundle.width, STANDARD_RESOLUTION.0);
        assert_eq!(
            bundle.data.len(),
            STANDARD_RESOLUTION.0 as usize * STANDARD_RESOLUTION.1 as usize * 3
        );
        Ok(())
    }

    #[test]
    fn test_landscape_frame_plot_custom_resolution() -> Result<()> {
        let bundle = landscape_frame_plot(&backdrop(), 4, &rows(), false, None, Some((400, 300)))?;
        assert_eq!(bundle.data.len(), 400 * 300 * 3);
        Ok(())
    }

    #[test]
    fn test_landscape_frame_plot_empty_iteration() -> Result<()> {
        let path = PathBuf::from(COMMON_PATH);
        setup_folder(&path)?;
        let files = vec![path.join("empty_frame.png")];
        clean_files(&files)?;

        let result = landscape_frame_plot(
            &backdrop(),
            9,
            &[],
            true,
            Some(files[0].as_path()),
            None,
        );

        assert!(result.is_err());
        assert!(!files[0].is_file());
        Ok(())
    }

    #[test]
    fn test_landscape_frame_plot_too_small() {
        let result = landscape_frame_plot(&backdrop(), 4, &rows(), true, None, Some((200, 50)));
        assert!(result.is_err());
    }

    #[test]
    fn test_landscape_frame_plot_clips_far_agents() -> Result<()> {
        let mut rows = rows();
        rows.push(RunRecord {
            iteration: 4,
            agent_id: Some(2),
            fitness: 1e6,
            x0: 1e9,
            x1: 0.0,
        });
        rows.push(RunRecord {
            iteration: 4,
            agent_id: Some(3),
            fitness: 2e6,
            x0: f64::INFINITY,
            x1: f64::NAN,
        });

        let bundle = landscape_frame_plot(&backdrop(), 4, &rows, true, None, Some((400, 300)))?;
        assert_eq!(bundle.data.len(), 400 * 300 * 3);
        Ok(())
    }

    #[test]
    fn test_landscape_frame_plot_best_outside_domain() -> Result<()> {
        let rows = vec![
            RunRecord {
                iteration: 0,
                agent_id: Some(0),
                fitness: -1.0,
                x0: 1e12,
                x1: -1e12,
            },
            RunRecord {
                iteration: 0,
                agent_id: Some(1),
                fitness: 3.0,
                x0: 2.0,
                x1: 2.0,
            },
        ];

        let bundle = landscape_frame_plot(&backdrop(), 0, &rows, false, None, Some((400, 300)))?;
        assert_eq!(bundle.width, 400);
        Ok(())
    }

    #[test]
    fn test_within_domain() {
        let landscape = Benchmark::Booth.landscape();
        assert!(within_domain(&landscape, 10.0, -10.0));
        assert!(!within_domain(&landscape, 10.5, 0.0));
        assert!(!within_domain(&landscape, 1e9, 0.0));
        assert!(!within_domain(&landscape, 0.0, f64::NAN));
        assert!(!within_domain(&landscape, f64::NEG_INFINITY, 0.0));
    }

    #[test]
    fn test_star_points() {
        let points = star_points(10);
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], (0, -10));
    }

    #[test]
    fn test_backdrop_levels() {
        let backdrop = backdrop();
        assert_eq!(backdrop.contours.len(), 10);
        let first = backdrop.contours[0].level;
        assert_eq!(backdrop.level_color(first), ColorMapKind::Viridis.color_at(0.0));
    }
}
