use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use plotters::{coord::types::RangedCoordf64, coord::ranged1d::Ranged, prelude::*};
use tracing::trace;

use super::PngBundle;
use crate::{
    core::{aggregate::FitnessSummary, error::VisError},
    vis::plotting::{
        allocate_buffer, AXIS_LABEL_AREA, AXIS_STYLE, BAND_OPACITY, CAPTION_STYLE, CHART_MARGIN,
        COLORS, LEGEND_OPACITY, LEGEND_PATH_LENGTH, STANDARD_RESOLUTION, X_MARGIN, Y_MARGIN,
    },
};

/// Generates the fitness summary plot: the median over runs as a line and the
/// band between the 25th and 75th percentile shaded around it.
///
/// With `log_y` the fitness axis is logarithmic, which requires strictly
/// positive fitness values.
///
/// Saves the plot to the optionally provided path as a PNG,
/// returns the raw pixel buffer.
///
/// # Errors
///
/// Returns an error for an empty summary, non-positive values on a log axis
/// or if drawing and saving fails.
#[allow(clippy::cast_precision_loss)]
#[tracing::instrument(level = "trace", skip(summary))]
pub fn fitness_band_plot(
    summary: &FitnessSummary,
    path: Option<&Path>,
    title: Option<&str>,
    y_label: Option<&str>,
    log_y: bool,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle> {
    trace!("Generating fitness band plot.");

    if summary.is_empty() {
        return Err(VisError::InvalidConfig("summary has no iterations".to_string()).into());
    }

    let (width, height) = resolution.unwrap_or(STANDARD_RESOLUTION);
    let title = title.unwrap_or("Fitness");
    let y_label = y_label.unwrap_or("fitness");

    let y_min = *summary
        .lower_quartile
        .min()
        .context("Lower percentile contains NaN")?;
    let y_max = *summary
        .upper_quartile
        .max()
        .context("Upper percentile contains NaN")?;

    let x_max = (summary.len() - 1).max(1) as f64;
    let x_range = x_max * X_MARGIN;
    let x_axis = -x_range..x_max + x_range;

    let mut buffer = allocate_buffer(width, height);

    {
        let root = BitMapBackend::with_buffer(&mut buffer[..], (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut builder = ChartBuilder::on(&root);
        builder
            .caption(title, CAPTION_STYLE.into_font())
            .margin(CHART_MARGIN)
            .x_label_area_size(AXIS_LABEL_AREA)
            .y_label_area_size(AXIS_LABEL_AREA);

        if log_y {
            if y_min <= 0.0 {
                return Err(VisError::InvalidConfig(format!(
                    "log scale needs positive fitness, lowest percentile is {y_min}"
                ))
                .into());
            }
            let mut chart =
                builder.build_cartesian_2d(x_axis, (y_min * 0.5..y_max * 2.0).log_scale())?;
            chart
                .configure_mesh()
                .x_desc("iteration")
                .x_label_style(AXIS_STYLE.into_font())
                .y_desc(y_label)
                .y_label_style(AXIS_STYLE.into_font())
                .y_label_formatter(&|y| format!("{y:e}"))
                .draw()?;
            draw_band(&mut chart, summary)?;
        } else {
            let y_range = if y_max - y_min > f64::EPSILON {
                y_max - y_min
            } else {
                y_max.abs().max(1.0)
            };
            let mut chart = builder.build_cartesian_2d(
                x_axis,
                y_range.mul_add(-Y_MARGIN, y_min)..y_range.mul_add(Y_MARGIN, y_max),
            )?;
            chart
                .configure_mesh()
                .x_desc("iteration")
                .x_label_style(AXIS_STYLE.into_font())
                .y_desc(y_label)
                .y_label_style(AXIS_STYLE.into_font())
                .draw()?;
            draw_band(&mut chart, summary)?;
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
        .with_context(|| format!("Failed to save summary plot '{}'", path.display()))?;
    }

    Ok(PngBundle {
        data: buffer,
        width,
        height,
    })
}

#[allow(clippy::cast_precision_loss)]
fn indexed(values: &Array1<f64>) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
    values
        .iter()
        .enumerate()
        .map(|(iteration, &value)| (iteration as f64, value))
}

fn draw_band<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    summary: &FitnessSummary,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    Y: Ranged<ValueType = f64>,
{
    let color = COLORS[0];
    let band: Vec<(f64, f64)> = indexed(&summary.upper_quartile)
        .chain(indexed(&summary.lower_quartile).rev())
        .collect();

    chart
        .draw_series(std::iter::once(Polygon::new(
            band,
            color.mix(BAND_OPACITY).filled(),
        )))?
        .label("25th to 75th percentile")
        .legend(move |(x, y)| {
            Rectangle::new(
                [(x, y - 5), (x + LEGEND_PATH_LENGTH, y + 5)],
                color.mix(BAND_OPACITY).filled(),
            )
        });

    chart
        .draw_series(LineSeries::new(
            indexed(&summary.median),
            color.stroke_width(2),
        ))?
        .label("median")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + LEGEND_PATH_LENGTH, y)], color.stroke_width(2))
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(LEGEND_OPACITY))
        .border_style(BLACK)
        .label_font(AXIS_STYLE.into_font())
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;
    use crate::tests::{clean_files, setup_folder};

    const COMMON_PATH: &str = "tests/vis/plotting/png/band";

    fn summary() -> FitnessSummary {
        FitnessSummary {
            median: array![100.0, 40.0, 12.0, 5.0, 4.5],
            lower_quartile: array![80.0, 30.0, 8.0, 3.0, 2.5],
            upper_quartile: array![120.0, 55.0, 20.0, 9.0, 6.0],
        }
    }

    #[test]
    fn test_fitness_band_plot() -> Result<()> {
        let path = Path::new(COMMON_PATH);
        setup_folder(path)?;
        let files = vec![path.join("fitness_band.png")];
        clean_files(&files)?;

        fitness_band_plot(
            &summary(),
            Some(files[0].as_path()),
            Some("Best fitness"),
            None,
            false,
            None,
        )?;

        assert!(files[0].is_file());
        Ok(())
    }

    #[test]
    fn test_fitness_band_plot_log() -> Result<()> {
        let path = Path::new(COMMON_PATH);
        setup_folder(path)?;
        let files = vec![path.join("fitness_band_log.png")];
        clean_files(&files)?;

        fitness_band_plot(&summary(), Some(files[0].as_path()), None, None, true, None)?;

        assert!(files[0].is_file());
        Ok(())
    }

    #[test]
    fn test_fitness_band_plot_log_negative() -> Result<()> {
        let path = Path::new(COMMON_PATH);
        setup_folder(path)?;
        let files = vec![path.join("fitness_band_log_negative.png")];
        clean_files(&files)?;

        let mut summary = summary();
        summary.lower_quartile[4] = -1.0;
        let result = fitness_band_plot(&summary, Some(files[0].as_path()), None, None, true, None);

        assert!(result.is_err());
        assert!(!files[0].is_file());
        Ok(())
    }

    #[test]
    fn test_fitness_band_plot_single_iteration() -> Result<()> {
        let summary = FitnessSummary {
            median: array![1.0],
            lower_quartile: array![1.0],
            upper_quartile: array![1.0],
        };
        let bundle = fitness_band_plot(&summary, None, None, None, false, Some((400, 300)))?;
        assert_eq!(bundle.data.len(), 400 * 300 * 3);
        Ok(())
    }

    #[test]
    fn test_fitness_band_plot_empty() {
        let summary = FitnessSummary {
            median: Array1::zeros(0),
            lower_quartile: Array1::zeros(0),
            upper_quartile: Array1::zeros(0),
        };
        assert!(fitness_band_plot(&summary, None, None, None, false, None).is_err());
    }
}
