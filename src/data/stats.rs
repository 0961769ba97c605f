use serde::{Deserialize, Serialize};

use crate::data::sample::RawSample;
use crate::error::Error;

/// Summary ranges of the time and m/z columns of one sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeMassStats {
    pub time_min: f64,
    pub time_max: f64,
    pub time_range: f64,
    pub mass_min: f64,
    pub mass_max: f64,
    pub mass_range: f64,
}

/// Computes summary statistics for the time and m/z columns of a sample.
///
/// # Arguments
///
/// * `sample` - The raw sample table to summarize.
///
/// # Returns
///
/// * `TimeMassStats` - Min, max and range of the time and mass columns.
///
/// # Errors
///
/// * `Error::EmptyInput` if the sample has zero rows.
pub fn summary_stats(sample: &RawSample) -> Result<TimeMassStats, Error> {
    if sample.is_empty() {
        return Err(Error::EmptyInput);
    }

    let (mut time_min, mut time_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut mass_min, mut mass_max) = (f64::INFINITY, f64::NEG_INFINITY);

    for (&time, &mass) in sample.time.iter().zip(sample.mass.iter()) {
        time_min = time_min.min(time);
        time_max = time_max.max(time);
        mass_min = mass_min.min(mass);
        mass_max = mass_max.max(mass);
    }

    Ok(TimeMassStats {
        time_min,
        time_max,
        time_range: time_max - time_min,
        mass_min,
        mass_max,
        mass_range: mass_max - mass_min,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_stats() {
        let sample = RawSample::new(
            vec![0.0, 12.5, 24.9],
            vec![4.0, 28.2, 333.7],
            vec![1.0, 2.0, 3.0],
        );

        let stats = summary_stats(&sample).unwrap();

        assert!((stats.time_min - 0.0).abs() < 1e-12);
        assert!((stats.time_max - 24.9).abs() < 1e-12);
        assert!((stats.time_range - 24.9).abs() < 1e-12);
        assert!((stats.mass_min - 4.0).abs() < 1e-12);
        assert!((stats.mass_max - 333.7).abs() < 1e-12);
        assert!((stats.mass_range - 329.7).abs() < 1e-12);
    }

    #[test]
    fn test_summary_stats_single_row() {
        let sample = RawSample::new(vec![3.0], vec![18.0], vec![5.0]);
        let stats = summary_stats(&sample).unwrap();

        assert!((stats.time_range - 0.0).abs() < 1e-12);
        assert!((stats.mass_range - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_stats_empty() {
        let sample = RawSample::new(vec![], vec![], vec![]);
        assert!(matches!(summary_stats(&sample), Err(Error::EmptyInput)));
    }
}
