use itertools::iproduct;
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::preprocessing::{preprocess_sample, PreprocessConfig};
use crate::data::sample::{RawSample, ScaledSample, SampleSource};
use crate::error::Error;

/// Number of integer m/z values in the feature schema, covering [0, 350).
pub const MASS_BINS: usize = 350;
/// Number of time bins in the feature schema.
pub const TIME_BINS: usize = 50;
/// Width of one time bin in seconds.
pub const TIME_BIN_WIDTH: f64 = 0.5;
/// Upper edge of the binned time range; times at or past this are dropped.
pub const TIME_MAX: f64 = 25.0;
/// Total width of one sample's feature vector.
pub const FEATURE_COUNT: usize = MASS_BINS * TIME_BINS;

/// One sample's fixed-width feature vector.
///
/// Holds `FEATURE_COUNT` values in mass-major order: all 50 time bins of
/// mass 0, then all 50 bins of mass 1, and so on. The schema is
/// identical for every sample, so rows can be stacked directly into a
/// training matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub values: Vec<f64>,
}

impl FeatureRow {
    /// Returns the feature value for a `(rounded_mass, time_bin)` cell.
    ///
    /// # Panics
    ///
    /// Panics if `rounded_mass >= MASS_BINS` or `time_bin >= TIME_BINS`;
    /// use [`FeatureRow::cell`] for a checked lookup.
    pub fn get(&self, rounded_mass: usize, time_bin: usize) -> f64 {
        assert!(rounded_mass < MASS_BINS, "rounded_mass {rounded_mass} out of schema");
        assert!(time_bin < TIME_BINS, "time_bin {time_bin} out of schema");
        self.values[rounded_mass * TIME_BINS + time_bin]
    }

    /// Returns the feature value for a `(rounded_mass, time_bin)` cell,
    /// or `None` when either coordinate falls outside the schema.
    pub fn cell(&self, rounded_mass: usize, time_bin: usize) -> Option<f64> {
        if rounded_mass >= MASS_BINS || time_bin >= TIME_BINS {
            return None;
        }
        Some(self.values[rounded_mass * TIME_BINS + time_bin])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Enumerates the canonical `(rounded_mass, time_bin)` column schema.
///
/// The ordering matches [`FeatureRow`]: mass-major, time bin minor. It
/// is fixed and sample-independent, which downstream training code
/// relies on for feature alignment.
pub fn feature_labels() -> Vec<(i64, usize)> {
    iproduct!(0..MASS_BINS as i64, 0..TIME_BINS).collect()
}

/// Maps a retention time to its half-open bin `[i * 0.5, (i + 1) * 0.5)`,
/// or `None` for times outside `[0, 25)`.
pub fn time_bin_index(time: f64) -> Option<usize> {
    if time < 0.0 || time >= TIME_MAX {
        return None;
    }
    let index = (time / TIME_BIN_WIDTH).floor() as usize;
    // Guard the upper edge against float division landing on TIME_BINS
    if index >= TIME_BINS {
        return None;
    }
    Some(index)
}

/// Bins a preprocessed sample into the fixed (mass × time-bin) schema.
///
/// Every row is scattered into a dense 350×50 grid initialized to zero,
/// keeping the maximum `int_minsub_scaled` per cell; cells no row falls
/// into stay 0.0. Rows with `time` outside `[0, 25)` or `rounded_mass`
/// outside `[0, 350)` are dropped. Total: an empty sample produces an
/// all-zero feature row.
///
/// # Arguments
///
/// * `sample` - The preprocessed (scaled) sample table.
///
/// # Returns
///
/// * `FeatureRow` - The 17,500-wide feature vector in mass-major order.
pub fn int_per_timebin(sample: &ScaledSample) -> FeatureRow {
    let mut grid: DMatrix<f64> = DMatrix::zeros(MASS_BINS, TIME_BINS);

    for (i, &mass) in sample.rounded_mass.iter().enumerate() {
        if mass < 0 || mass >= MASS_BINS as i64 {
            continue;
        }
        let Some(bin) = time_bin_index(sample.time[i]) else {
            continue;
        };

        let cell = &mut grid[(mass as usize, bin)];
        if sample.int_minsub_scaled[i] > *cell {
            *cell = sample.int_minsub_scaled[i];
        }
    }

    let mut values = Vec::with_capacity(FEATURE_COUNT);
    for mass in 0..MASS_BINS {
        for bin in 0..TIME_BINS {
            values.push(grid[(mass, bin)]);
        }
    }

    FeatureRow { values }
}

/// Stacks per-sample feature rows into an n × 17,500 matrix.
pub fn feature_matrix(rows: &[FeatureRow]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), FEATURE_COUNT, |r, c| rows[r].values[c])
}

/// Preprocesses and bins many raw samples in parallel.
///
/// Output order matches input order; each sample is independent.
pub fn featurize_batch(samples: &[RawSample], config: &PreprocessConfig) -> Vec<FeatureRow> {
    let rows: Vec<FeatureRow> = samples
        .par_iter()
        .map(|sample| int_per_timebin(&preprocess_sample(sample, config)))
        .collect();

    debug!("featurized {} samples", rows.len());

    rows
}

/// Loads, preprocesses and bins a set of sample files in parallel.
///
/// Per-file failures (missing file, malformed header) are returned in
/// place so callers can skip failed samples without losing the rest of
/// the batch.
pub fn featurize_files(
    source: &SampleSource,
    paths: &[String],
    config: &PreprocessConfig,
) -> Vec<Result<FeatureRow, Error>> {
    let rows: Vec<Result<FeatureRow, Error>> = paths
        .par_iter()
        .map(|path| {
            let sample = source.load_sample(path)?;
            Ok(int_per_timebin(&preprocess_sample(&sample, config)))
        })
        .collect();

    let failed = rows.iter().filter(|r| r.is_err()).count();
    debug!("featurized {} files, {} failed", rows.len() - failed, failed);

    rows
}
