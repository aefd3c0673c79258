pub mod contour;

use std::{f64::consts::PI, str::FromStr};

use anyhow::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

use super::error::VisError;

/// Booth function.
///
/// Global minimum: f(1, 3) = 0
#[must_use]
pub fn booth(x: f64, y: f64) -> f64 {
    2.0f64.mul_add(y, x - 7.0).powi(2) + 2.0f64.mul_add(x, y - 5.0).powi(2)
}

/// Eggholder function.
///
/// Global minimum: f(512, 404.2319) ≈ -959.6407
#[must_use]
pub fn eggholder(x: f64, y: f64) -> f64 {
    let shifted = y + 47.0;
    -shifted * (x / 2.0 + shifted).abs().sqrt().sin() - x * (x - shifted).abs().sqrt().sin()
}

/// Two dimensional Ackley function with a = 20, b = 0.2 and c = 2π.
///
/// Global minimum: f(0, 0) = 0
#[must_use]
pub fn ackley(x: f64, y: f64) -> f64 {
    const A: f64 = 20.0;
    const B: f64 = 0.2;
    const C: f64 = 2.0 * PI;
    let sum_sq = x.mul_add(x, y * y);
    let sum_cos = (C * x).cos() + (C * y).cos();
    -A * (-B * (sum_sq / 2.0).sqrt()).exp() - (sum_cos / 2.0).exp() + A + std::f64::consts::E
}

/// Selector for the benchmark landscapes the optimizer is run against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum Benchmark {
    #[strum(to_string = "Booth", serialize = "Booth Function")]
    Booth,
    #[default]
    #[strum(to_string = "Eggholder", serialize = "Eggholder Function")]
    Eggholder,
    #[strum(to_string = "Ackley", serialize = "Ackley Function")]
    Ackley,
}

impl Benchmark {
    /// Parses a benchmark selector such as `booth` or `Eggholder Function`.
    ///
    /// # Errors
    ///
    /// Returns `VisError::UnknownBenchmark` if the name matches no landscape.
    pub fn parse(name: &str) -> Result<Self, VisError> {
        Self::from_str(name.trim()).map_err(|_| VisError::UnknownBenchmark(name.to_string()))
    }

    #[must_use]
    pub fn evaluate(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Booth => booth(x, y),
            Self::Eggholder => eggholder(x, y),
            Self::Ackley => ackley(x, y),
        }
    }

    /// Domain, optimum and closed form of the selected benchmark.
    #[must_use]
    pub const fn landscape(self) -> Landscape {
        match self {
            Self::Booth => Landscape {
                benchmark: self,
                x_range: (-10.0, 10.0),
                y_range: (-10.0, 10.0),
                optimum: (1.0, 3.0),
                optimum_value: 0.0,
            },
            Self::Eggholder => Landscape {
                benchmark: self,
                x_range: (-512.0, 512.0),
                y_range: (-512.0, 512.0),
                optimum: (512.0, 404.2319),
                optimum_value: -959.6407,
            },
            Self::Ackley => Landscape {
                benchmark: self,
                x_range: (-5.0, 5.0),
                y_range: (-5.0, 5.0),
                optimum: (0.0, 0.0),
                optimum_value: 0.0,
            },
        }
    }
}

impl TryFrom<String> for Benchmark {
    type Error = VisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Benchmark> for String {
    fn from(value: Benchmark) -> Self {
        value.to_string()
    }
}

/// A benchmark function together with its plotting domain and known optimum.
///
/// The optimum is only used for annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landscape {
    pub benchmark: Benchmark,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub optimum: (f64, f64),
    pub optimum_value: f64,
}

/// Regular samples of a landscape.
///
/// `values` is indexed `[(iy, ix)]`, so rows follow the y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub xs: Array1<f64>,
    pub ys: Array1<f64>,
    pub values: Array2<f64>,
}

impl Landscape {
    #[must_use]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.benchmark.evaluate(x, y)
    }

    #[must_use]
    pub fn name(&self) -> String {
        format!("{} Function", self.benchmark)
    }

    /// Label of the known optimum, e.g. `f(1, 3)=0`.
    #[must_use]
    pub fn ground_truth(&self) -> String {
        format!(
            "f({}, {})={}",
            self.optimum.0, self.optimum.1, self.optimum_value
        )
    }

    /// Samples the landscape on a `resolution x resolution` grid spanning
    /// its domain, end points included.
    ///
    /// # Errors
    ///
    /// Returns `VisError::InvalidConfig` if resolution is smaller than two.
    #[tracing::instrument(level = "debug")]
    pub fn surface(&self, resolution: usize) -> Result<Surface> {
        debug!("Sampling {} landscape.", self.benchmark);
        if resolution < 2 {
            return Err(VisError::InvalidConfig(format!(
                "grid resolution must be at least 2, got {resolution}"
            ))
            .into());
        }
        let xs = Array1::linspace(self.x_range.0, self.x_range.1, resolution);
        let ys = Array1::linspace(self.y_range.0, self.y_range.1, resolution);
        let values = Array2::from_shape_fn((ys.len(), xs.len()), |(iy, ix)| {
            self.evaluate(xs[ix], ys[iy])
        });
        Ok(Surface { xs, ys, values })
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn booth_known_optimum() {
        assert_relative_eq!(booth(1.0, 3.0), 0.0);
        assert_relative_eq!(booth(0.0, 0.0), 74.0);
    }

    #[test]
    fn ackley_known_optimum() {
        assert_relative_eq!(ackley(0.0, 0.0), 0.0, epsilon = 1e-12);
        assert!(ackley(1.0, 1.0) > 3.0);
    }

    #[test]
    fn eggholder_known_optimum() {
        assert_relative_eq!(eggholder(512.0, 404.2319), -959.6407, epsilon = 1e-3);
    }

    #[test]
    fn landscapes_report_their_optimum_value() {
        for benchmark in Benchmark::iter() {
            let landscape = benchmark.landscape();
            let (x, y) = landscape.optimum;
            assert_relative_eq!(
                landscape.evaluate(x, y),
                landscape.optimum_value,
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        for benchmark in Benchmark::iter() {
            let a = benchmark.evaluate(-3.25, 1.5);
            let b = benchmark.evaluate(-3.25, 1.5);
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn parse_accepts_script_names() {
        assert_eq!(Benchmark::parse("booth").unwrap(), Benchmark::Booth);
        assert_eq!(
            Benchmark::parse("Eggholder Function").unwrap(),
            Benchmark::Eggholder
        );
        assert_eq!(Benchmark::parse(" ACKLEY ").unwrap(), Benchmark::Ackley);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(
            Benchmark::parse("Rastrigin"),
            Err(VisError::UnknownBenchmark("Rastrigin".to_string()))
        );
    }

    #[test]
    fn ground_truth_label() {
        assert_eq!(
            Benchmark::Eggholder.landscape().ground_truth(),
            "f(512, 404.2319)=-959.6407"
        );
        assert_eq!(Benchmark::Booth.landscape().ground_truth(), "f(1, 3)=0");
    }

    #[test]
    fn surface_spans_domain() {
        let landscape = Benchmark::Booth.landscape();
        let surface = landscape.surface(21).unwrap();
        assert_eq!(surface.values.shape(), &[21, 21]);
        assert_relative_eq!(surface.xs[0], -10.0);
        assert_relative_eq!(surface.xs[20], 10.0);
        // x = 1, y = 3 sits on the grid at ix = 11, iy = 13
        assert_relative_eq!(surface.values[(13, 11)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(surface.values[(0, 0)], booth(-10.0, -10.0));
    }

    #[test]
    fn surface_rejects_degenerate_resolution() {
        let landscape = Benchmark::Ackley.landscape();
        assert!(landscape.surface(1).is_err());
    }
}
