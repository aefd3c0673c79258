use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use super::plotting::png::band::fitness_band_plot;
use crate::core::{
    aggregate::{best_median, load_run_collection, FitnessSummary},
    config::summary::Summary,
};

/// Loads all runs, reduces them to median and interquartile band and
/// saves the band plot to `output_path`.
///
/// # Errors
///
/// Returns `VisError::NoFiniteFitness` before plotting if every median is
/// NaN, and propagates loading, aggregation and plotting errors.
#[tracing::instrument(level = "info", skip(config))]
pub fn run_summary(config: &Summary) -> Result<FitnessSummary> {
    let collection = load_run_collection(config)?;
    let summary = collection.summarize()?;

    let best = best_median(&summary)?;

    if let Some(parent) = config
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fitness_band_plot(
        &summary,
        Some(config.output_path.as_path()),
        Some(&config.title),
        Some("best fitness"),
        config.log_y,
        Some(config.resolution),
    )?;

    info!(
        "Wrote {} (best median fitness {best:.4})",
        config.output_path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        core::error::VisError,
        tests::{clean_files, setup_folder},
    };

    const COMMON_PATH: &str = "tests/vis/summary";

    fn write_runs(dir: &Path, runs: usize, iterations: usize) -> Result<()> {
        for epoch in 0..runs {
            let mut contents = String::from("iteration, fitness, x0, x1\n");
            for iteration in 0..iterations {
                let fitness = 100.0 / (iteration as f64 + 1.0) + epoch as f64;
                contents.push_str(&format!("{iteration}, {fitness}, 0.0, 0.0\n"));
            }
            fs::write(dir.join(format!("best_solution_history_{epoch}.csv")), contents)?;
        }
        Ok(())
    }

    #[test_log::test]
    fn test_run_summary() -> Result<()> {
        let path = PathBuf::from(COMMON_PATH).join("pipeline");
        setup_folder(&path)?;
        write_runs(&path, 5, 20)?;
        let config = Summary {
            results_dir: path.clone(),
            epoch_count: 5,
            output_path: path.join("summary.png"),
            resolution: (600, 400),
            ..Default::default()
        };
        clean_files(&[config.output_path.clone()])?;

        let summary = run_summary(&config)?;

        assert_eq!(summary.len(), 20);
        assert_relative_eq!(summary.median[0], 102.0);
        assert_relative_eq!(summary.lower_quartile[0], 101.0);
        assert_relative_eq!(summary.upper_quartile[0], 103.0);
        assert!(config.output_path.is_file());
        Ok(())
    }

    #[test]
    fn test_run_summary_log_scale() -> Result<()> {
        let path = PathBuf::from(COMMON_PATH).join("log_scale");
        setup_folder(&path)?;
        write_runs(&path, 3, 10)?;
        let config = Summary {
            results_dir: path.clone(),
            epoch_count: 3,
            output_path: path.join("summary_log.png"),
            log_y: true,
            ..Default::default()
        };
        clean_files(&[config.output_path.clone()])?;

        run_summary(&config)?;

        assert!(config.output_path.is_file());
        Ok(())
    }

    #[test]
    fn test_run_summary_all_nan() -> Result<()> {
        let path = PathBuf::from(COMMON_PATH).join("all_nan");
        setup_folder(&path)?;
        for epoch in 0..2 {
            fs::write(
                path.join(format!("best_solution_history_{epoch}.csv")),
                "iteration, fitness, x0, x1\n0, NaN, 0.0, 0.0\n1, NaN, 0.0, 0.0\n",
            )?;
        }
        let config = Summary {
            results_dir: path.clone(),
            epoch_count: 2,
            output_path: path.join("summary_nan.png"),
            ..Default::default()
        };
        clean_files(&[config.output_path.clone()])?;

        let error = run_summary(&config).unwrap_err();

        assert_eq!(
            error.downcast_ref::<VisError>(),
            Some(&VisError::NoFiniteFitness)
        );
        assert!(!config.output_path.exists());
        Ok(())
    }

    #[test]
    fn test_run_summary_ragged() -> Result<()> {
        let path = PathBuf::from(COMMON_PATH).join("ragged");
        setup_folder(&path)?;
        write_runs(&path, 2, 10)?;
        let config = Summary {
            results_dir: path.clone(),
            epoch_count: 2,
            iteration_count: Some(12),
            output_path: path.join("summary_ragged.png"),
            ..Default::default()
        };
        clean_files(&[config.output_path.clone()])?;

        assert!(run_summary(&config).is_err());
        assert!(!config.output_path.exists());
        Ok(())
    }
}
