use std::collections::BTreeMap;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::algorithm::preprocessing::round_and_filter;
use crate::data::sample::{RawSample, SampleSource};
use crate::error::Error;

/// Width of one bar in m/z units.
const BAR_WIDTH: f64 = 5.0;

fn plot_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

/// Plots a mass spectrum at a given timestamp as a bar chart.
///
/// Draws intensity against m/z for the readings recorded at exactly
/// `timestamp`, titled with the timestamp. Matches the [`PanelFn`]
/// contract so it can be handed to [`grid_plot`] with timestamps as the
/// iteration keys.
///
/// [`PanelFn`]: crate::viz::grid::PanelFn
/// [`grid_plot`]: crate::viz::grid::grid_plot
pub fn plot_mass_spectrum<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: &RawSample,
    timestamp: &f64,
) -> Result<(), Error> {
    let slice = data.at_time(*timestamp);

    let mass_max = slice.mass.iter().cloned().fold(0.0, f64::max);
    let intensity_max = slice.intensity.iter().cloned().fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption(format!("{timestamp}"), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..mass_max + BAR_WIDTH, 0.0..intensity_max * 1.05 + 1.0)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("m/z")
        .y_desc("intensity")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            slice
                .mass
                .iter()
                .zip(slice.intensity.iter())
                .map(|(&mass, &intensity)| {
                    Rectangle::new(
                        [(mass - BAR_WIDTH / 2.0, 0.0), (mass + BAR_WIDTH / 2.0, intensity)],
                        BLUE.filled(),
                    )
                }),
        )
        .map_err(plot_err)?;

    Ok(())
}

/// Plots a spectrogram for the sample file named by `features_path`.
///
/// Loads the sample through `source`, applies rounding and duplicate
/// aggregation, and draws one intensity-vs-time line per rounded mass.
///
/// # Errors
///
/// * `Error::EmptyInput` if the loaded sample has no rows.
/// * Loader errors from [`SampleSource::load_sample`].
pub fn plot_spectrogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    source: &SampleSource,
    features_path: &str,
) -> Result<(), Error> {
    let sample = source.load_sample(features_path)?;
    let rounded = round_and_filter(&sample, None);

    if rounded.is_empty() {
        return Err(Error::EmptyInput);
    }

    // One (time, intensity) trace per rounded mass; rows arrive ordered
    // by (time, rounded_mass), so each trace is already time-ascending.
    let mut traces: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    for (i, &mass) in rounded.rounded_mass.iter().enumerate() {
        traces
            .entry(mass)
            .or_default()
            .push((rounded.time[i], rounded.intensity[i]));
    }

    let time_max = rounded.time.iter().cloned().fold(0.0, f64::max);
    let intensity_max = rounded.intensity.iter().cloned().fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption(features_path, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..time_max * 1.05 + 1e-6, 0.0..intensity_max * 1.05 + 1e-6)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("time")
        .y_desc("intensity")
        .draw()
        .map_err(plot_err)?;

    for (idx, (_, trace)) in traces.into_iter().enumerate() {
        chart
            .draw_series(LineSeries::new(trace, &Palette99::pick(idx)))
            .map_err(plot_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plot_mass_spectrum() {
        let mut buffer = vec![0u8; 400 * 300 * 3];
        let sample = RawSample::new(
            vec![1.0, 1.0, 2.0],
            vec![18.0, 28.0, 44.0],
            vec![5.0, 12.0, 7.0],
        );

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (400, 300)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            plot_mass_spectrum(&root, &sample, &1.0).unwrap();
            root.present().unwrap();
        }

        assert!(buffer.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_plot_spectrogram() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("s1.csv")).unwrap();
        file.write_all(b"time,mass,intensity\n0.0,28.2,10.0\n0.5,28.4,12.0\n0.5,32.0,3.0\n")
            .unwrap();

        let mut buffer = vec![0u8; 400 * 300 * 3];
        let source = SampleSource::new(dir.path());

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (400, 300)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            plot_spectrogram(&root, &source, "s1.csv").unwrap();
            root.present().unwrap();
        }

        assert!(buffer.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_plot_spectrogram_empty_sample() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("empty.csv")).unwrap();
        file.write_all(b"time,mass,intensity\n").unwrap();

        let mut buffer = vec![0u8; 100 * 100 * 3];
        let source = SampleSource::new(dir.path());
        let root = BitMapBackend::with_buffer(&mut buffer, (100, 100)).into_drawing_area();

        assert!(matches!(
            plot_spectrogram(&root, &source, "empty.csv"),
            Err(Error::EmptyInput)
        ));
    }
}
