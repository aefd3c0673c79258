use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::VisError;

/// One agent observed at one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub iteration: u32,
    #[serde(default)]
    pub agent_id: Option<usize>,
    pub fitness: f64,
    pub x0: f64,
    pub x1: f64,
}

/// All rows of an agents history file, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunLog {
    pub records: Vec<RunRecord>,
}

impl RunLog {
    #[must_use]
    pub const fn new(records: Vec<RunRecord>) -> Self {
        Self { records }
    }

    /// Reads an agents history CSV.
    ///
    /// Expects a header with at least `iteration`, `fitness`, `x0` and `x1`.
    /// Surrounding whitespace is trimmed since the optimizer writes `", "`
    /// separated fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be opened or a row fails to parse.
    #[tracing::instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading run log.");
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open run log '{}'", path.display()))?;

        let mut records = Vec::new();
        for (row, result) in reader.deserialize().enumerate() {
            let record: RunRecord = result.with_context(|| {
                format!("Failed to parse row {} of '{}'", row + 1, path.display())
            })?;
            records.push(record);
        }
        info!("Loaded {} rows from {}", records.len(), path.display());
        Ok(Self { records })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Groups rows by iteration in ascending order, keeping file order
    /// within each iteration.
    #[must_use]
    pub fn by_iteration(&self) -> BTreeMap<u32, Vec<RunRecord>> {
        let mut groups: BTreeMap<u32, Vec<RunRecord>> = BTreeMap::new();
        for record in &self.records {
            groups
                .entry(record.iteration)
                .or_default()
                .push(record.clone());
        }
        groups
    }
}

/// Returns the row with the lowest fitness.
///
/// Ties resolve to the first row in input order. NaN fitness values never
/// win against a number.
///
/// # Errors
///
/// Returns `VisError::EmptyIteration` if `rows` is empty.
pub fn best_record(iteration: u32, rows: &[RunRecord]) -> Result<&RunRecord, VisError> {
    rows.iter()
        .reduce(|best, candidate| {
            if candidate.fitness < best.fitness || (best.fitness.is_nan() && !candidate.fitness.is_nan()) {
                candidate
            } else {
                best
            }
        })
        .ok_or(VisError::EmptyIteration(iteration))
}

/// Keeps every `stride`-th iteration plus the last one.
///
/// # Errors
///
/// Returns `VisError::InvalidConfig` if stride is zero.
pub fn select_iterations(iterations: &[u32], stride: usize) -> Result<Vec<u32>, VisError> {
    if stride == 0 {
        return Err(VisError::InvalidConfig(
            "frame stride must be positive".to_string(),
        ));
    }
    let selected = iterations
        .iter()
        .step_by(stride)
        .chain(iterations.last())
        .copied()
        .dedup()
        .collect();
    Ok(selected)
}
