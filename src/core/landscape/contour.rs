use anyhow::Result;
use ndarray_stats::QuantileExt;
use tracing::{debug, trace};

use super::Surface;
use crate::core::error::VisError;

pub type Point = (f64, f64);

/// All segments of a single iso-line of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub segments: Vec<(Point, Point)>,
}

/// Computes `levels` evenly spaced iso-values strictly between the minimum
/// and maximum of `values`.
///
/// A constant surface yields no levels.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn contour_levels(min: f64, max: f64, levels: usize) -> Vec<f64> {
    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return Vec::new();
    }
    let step = (max - min) / (levels + 1) as f64;
    (1..=levels)
        .map(|k| (k as f64).mul_add(step, min))
        .collect()
}

/// Extracts iso-lines from a sampled surface using marching squares.
///
/// Saddle cells are disambiguated by the average of their four corners.
///
/// # Errors
///
/// Returns `VisError::InvalidConfig` if no levels are requested or the
/// surface contains NaN values.
#[tracing::instrument(level = "debug", skip(surface))]
pub fn contour_lines(surface: &Surface, levels: usize) -> Result<Vec<ContourLine>> {
    debug!("Extracting contour lines.");
    if levels == 0 {
        return Err(VisError::InvalidConfig("contour levels must be positive".to_string()).into());
    }
    let min = *surface
        .values
        .min()
        .map_err(|_| VisError::InvalidConfig("surface contains NaN values".to_string()))?;
    let max = *surface
        .values
        .max()
        .map_err(|_| VisError::InvalidConfig("surface contains NaN values".to_string()))?;

    let lines = contour_levels(min, max, levels)
        .into_iter()
        .map(|level| ContourLine {
            level,
            segments: iso_segments(surface, level),
        })
        .collect();
    Ok(lines)
}

fn iso_segments(surface: &Surface, level: f64) -> Vec<(Point, Point)> {
    trace!("Marching squares at level {level}.");
    let (ny, nx) = surface.values.dim();
    let z = &surface.values;
    let mut segments = Vec::new();

    for iy in 0..ny.saturating_sub(1) {
        for ix in 0..nx.saturating_sub(1) {
            // counter clockwise, starting bottom left
            let corners = [
                (surface.xs[ix], surface.ys[iy], z[(iy, ix)]),
                (surface.xs[ix + 1], surface.ys[iy], z[(iy, ix + 1)]),
                (surface.xs[ix + 1], surface.ys[iy + 1], z[(iy + 1, ix + 1)]),
                (surface.xs[ix], surface.ys[iy + 1], z[(iy + 1, ix)]),
            ];
            let above = corners.map(|c| c.2 >= level);
            if above.iter().all(|&a| a) || above.iter().all(|&a| !a) {
                continue;
            }

            // crossing on edge i connects corner i and corner i + 1
            let mut crossings: [Option<Point>; 4] = [None; 4];
            for (edge, crossing) in crossings.iter_mut().enumerate() {
                let a = corners[edge];
                let b = corners[(edge + 1) % 4];
                if above[edge] != above[(edge + 1) % 4] {
                    let t = (level - a.2) / (b.2 - a.2);
                    *crossing = Some((t.mul_add(b.0 - a.0, a.0), t.mul_add(b.1 - a.1, a.1)));
                }
            }

            match crossings {
                [Some(e0), Some(e1), Some(e2), Some(e3)] => {
                    let center = corners.iter().map(|c| c.2).sum::<f64>() / 4.0;
                    if above[0] == (center >= level) {
                        segments.push((e0, e1));
                        segments.push((e2, e3));
                    } else {
                        segments.push((e3, e0));
                        segments.push((e1, e2));
                    }
                }
                _ => {
                    let mut points = crossings.iter().flatten();
                    if let (Some(&a), Some(&b)) = (points.next(), points.next()) {
                        segments.push((a, b));
                    }
                }
            }
        }
    }
    segments
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};

    use super::*;
    use crate::core::landscape::Benchmark;

    fn cone(resolution: usize) -> Surface {
        let xs = Array1::<f64>::linspace(-2.0, 2.0, resolution);
        let ys = Array1::<f64>::linspace(-2.0, 2.0, resolution);
        let values = Array2::from_shape_fn((resolution, resolution), |(iy, ix)| {
            xs[ix].hypot(ys[iy])
        });
        Surface { xs, ys, values }
    }

    #[test]
    fn levels_are_strictly_inside_range() {
        let levels = contour_levels(0.0, 10.0, 4);
        assert_eq!(levels, vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn constant_surface_has_no_levels() {
        assert!(contour_levels(3.0, 3.0, 30).is_empty());
    }

    #[test]
    fn cone_contours_are_circles() {
        let surface = cone(101);
        let lines = contour_lines(&surface, 3).unwrap();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(!line.segments.is_empty());
            for (a, b) in &line.segments {
                // interpolated radius error is bounded by the cell size
                assert_relative_eq!(a.0.hypot(a.1), line.level, epsilon = 0.05);
                assert_relative_eq!(b.0.hypot(b.1), line.level, epsilon = 0.05);
            }
        }
    }

    #[test]
    fn saddle_cell_yields_two_segments() {
        let surface = Surface {
            xs: Array1::from_vec(vec![0.0, 1.0]),
            ys: Array1::from_vec(vec![0.0, 1.0]),
            values: Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap(),
        };
        let segments = iso_segments(&surface, 0.5);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn zero_levels_is_rejected() {
        let surface = cone(5);
        assert!(contour_lines(&surface, 0).is_err());
    }

    #[test]
    fn benchmark_backdrop_has_contours() {
        let surface = Benchmark::Ackley.landscape().surface(60).unwrap();
        let lines = contour_lines(&surface, 30).unwrap();
        assert_eq!(lines.len(), 30);
        assert!(lines.iter().all(|line| !line.segments.is_empty()));
    }
}
