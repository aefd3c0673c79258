use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Axis};
use ndarray_stats::{interpolate::Linear, QuantileExt};
use noisy_float::types::n64;
use tracing::{debug, info};

use super::{
    config::summary::Summary,
    data::fitness_history::{load_fitness_history, FitnessHistory},
    error::VisError,
};

/// Fitness of many independent runs stacked into a `(runs, iterations)` table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunCollection {
    pub values: Array2<f64>,
}

/// Per iteration statistics across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessSummary {
    pub median: Array1<f64>,
    pub lower_quartile: Array1<f64>,
    pub upper_quartile: Array1<f64>,
}

impl FitnessSummary {
    #[must_use]
    pub fn len(&self) -> usize {
        self.median.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.median.is_empty()
    }
}

impl RunCollection {
    /// Stacks the histories of independent runs.
    ///
    /// All runs must have the same length. If `expected_len` is given, that
    /// length is enforced, otherwise the first run sets it.
    ///
    /// # Errors
    ///
    /// Returns `VisError::NoRuns` for an empty slice and
    /// `VisError::RaggedRuns` for the first run with a deviating length.
    #[tracing::instrument(level = "debug", skip(histories))]
    pub fn stack(histories: &[FitnessHistory], expected_len: Option<usize>) -> Result<Self, VisError> {
        debug!("Stacking {} runs.", histories.len());
        let first = histories.first().ok_or(VisError::NoRuns)?;
        let expected = expected_len.unwrap_or_else(|| first.len());

        for (epoch, history) in histories.iter().enumerate() {
            if history.len() != expected {
                return Err(VisError::RaggedRuns {
                    epoch,
                    expected,
                    found: history.len(),
                });
            }
        }

        let values = Array2::from_shape_fn((histories.len(), expected), |(run, iteration)| {
            histories[run].values[iteration]
        });
        Ok(Self { values })
    }

    #[must_use]
    pub fn num_runs(&self) -> usize {
        self.values.shape()[0]
    }

    #[must_use]
    pub fn num_iterations(&self) -> usize {
        self.values.shape()[1]
    }

    /// Median and interquartile range along the run axis.
    ///
    /// Quantiles interpolate linearly between order statistics, NaN values
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection has no runs.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn summarize(&self) -> Result<FitnessSummary> {
        debug!("Summarizing run collection.");
        let mut values = self.values.clone();
        let mut quantile = |q: f64| {
            values
                .quantile_axis_skipnan_mut(Axis(0), n64(q), &Linear)
                .with_context(|| format!("Failed to compute {q} quantile across runs"))
        };
        let lower_quartile = quantile(0.25)?;
        let median = quantile(0.5)?;
        let upper_quartile = quantile(0.75)?;
        Ok(FitnessSummary {
            median,
            lower_quartile,
            upper_quartile,
        })
    }
}

/// Loads `epoch_count` run histories named by the summary config.
///
/// # Errors
///
/// Fails on the first missing or unreadable file and on runs of unequal
/// length.
#[tracing::instrument(level = "info", skip(config))]
pub fn load_run_collection(config: &Summary) -> Result<RunCollection> {
    info!("Loading {} runs from {}", config.epoch_count, config.results_dir.display());
    let histories = (0..config.epoch_count)
        .map(|epoch| {
            let path = config.run_path(epoch);
            load_fitness_history(&path)
                .with_context(|| format!("Failed to load run {epoch} from '{}'", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    let collection = RunCollection::stack(&histories, config.iteration_count)?;
    info!(
        "Stacked {} runs with {} iterations each",
        collection.num_runs(),
        collection.num_iterations()
    );
    Ok(collection)
}

/// Lowest median fitness over all iterations.
///
/// # Errors
///
/// Returns `VisError::NoFiniteFitness` if the summary is empty or its
/// median contains only NaN.
pub fn best_median(summary: &FitnessSummary) -> Result<f64, VisError> {
    let min = *summary.median.min_skipnan();
    if min.is_nan() {
        return Err(VisError::NoFiniteFitness);
    }
    Ok(min)
}
