use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use ndarray::Array1;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct FitnessRecord {
    fitness: f64,
}

/// Best fitness of one run, one value per iteration in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessHistory {
    pub values: Array1<f64>,
}

impl FitnessHistory {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reads the `fitness` column of a best solution history CSV.
///
/// # Errors
///
/// Returns an error if the file can't be read, has no `fitness` column or
/// contains a value that is not a number.
#[tracing::instrument(level = "debug")]
pub fn load_fitness_history(path: &Path) -> Result<FitnessHistory> {
    debug!("Loading fitness history.");
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open fitness history '{}'", path.display()))?;

    let mut values = Vec::new();
    for result in reader.deserialize() {
        let record: FitnessRecord =
            result.with_context(|| format!("Failed to parse '{}'", path.display()))?;
        values.push(record.fitness);
    }

    Ok(FitnessHistory {
        values: Array1::from(values),
    })
}
