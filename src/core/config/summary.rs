use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters of the fitness summary over independent runs.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct Summary {
    pub results_dir: PathBuf,
    /// File name of one run, `{epoch}` is replaced by the zero based run index.
    pub file_template: String,
    pub epoch_count: usize,
    /// Expected length of every run. Inferred from the first run if unset.
    pub iteration_count: Option<usize>,
    pub output_path: PathBuf,
    pub title: String,
    pub log_y: bool,
    pub resolution: (u32, u32),
}

impl Default for Summary {
    #[tracing::instrument(level = "debug")]
    fn default() -> Self {
        debug!("Creating default summary config");
        Self {
            results_dir: PathBuf::from("results/multi_evaluation"),
            file_template: "best_solution_history_{epoch}.csv".to_string(),
            epoch_count: 10,
            iteration_count: None,
            output_path: PathBuf::from("fitness_summary.png"),
            title: "Best fitness over iterations".to_string(),
            log_y: false,
            resolution: (1000, 600),
        }
    }
}

impl Summary {
    /// Path of the history file of run `epoch`.
    #[must_use]
    pub fn run_path(&self, epoch: usize) -> PathBuf {
        self.results_dir
            .join(self.file_template.replace("{epoch}", &epoch.to_string()))
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::*;

    #[test]
    fn run_path_expands_epoch() {
        let summary = Summary::default();
        assert_eq!(
            summary.run_path(3),
            Path::new("results/multi_evaluation/best_solution_history_3.csv")
        );
    }
}
