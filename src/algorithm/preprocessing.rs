use std::collections::BTreeMap;

use log::debug;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::sample::{RawSample, RoundedSample, ScaledSample};

/// Rounded m/z of the helium carrier gas, always removed from samples.
pub const CARRIER_GAS_MASS: i64 = 4;

/// Configuration for sample preprocessing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Largest rounded m/z to keep; `None` keeps all masses (default: Some(350))
    pub mass_cutoff: Option<i64>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        PreprocessConfig { mass_cutoff: Some(350) }
    }
}

/// Rounds fractional m/z values, aggregates duplicates and drops
/// carrier-gas and over-cutoff masses.
///
/// Rounding is ties-to-even. Readings sharing a `(time, rounded_mass)`
/// pair are collapsed into one row carrying their mean intensity. Rows
/// with `rounded_mass` above `mass_cutoff` (when set) are dropped, as is
/// the helium carrier-gas signal at m/z 4.
///
/// # Arguments
///
/// * `sample` - The raw sample table.
/// * `mass_cutoff` - Optional largest rounded m/z to keep.
///
/// # Returns
///
/// * `RoundedSample` - One row per surviving `(time, rounded_mass)` pair,
///   ordered by `(time, rounded_mass)` ascending.
pub fn round_and_filter(sample: &RawSample, mass_cutoff: Option<i64>) -> RoundedSample {
    let mut groups: BTreeMap<(OrderedFloat<f64>, i64), (f64, usize)> = BTreeMap::new();

    for (i, &mass) in sample.mass.iter().enumerate() {
        let rounded = mass.round_ties_even() as i64;

        if rounded == CARRIER_GAS_MASS {
            continue;
        }
        if let Some(cutoff) = mass_cutoff {
            if rounded > cutoff {
                continue;
            }
        }

        let entry = groups
            .entry((OrderedFloat(sample.time[i]), rounded))
            .or_insert((0.0, 0));
        entry.0 += sample.intensity[i];
        entry.1 += 1;
    }

    let mut time = Vec::with_capacity(groups.len());
    let mut rounded_mass = Vec::with_capacity(groups.len());
    let mut intensity = Vec::with_capacity(groups.len());

    for ((t, mass), (sum, count)) in groups {
        time.push(t.into_inner());
        rounded_mass.push(mass);
        intensity.push(sum / count as f64);
    }

    RoundedSample::new(time, rounded_mass, intensity)
}

/// Subtracts the per-mass minimum intensity from every row.
///
/// For each distinct `rounded_mass` the smallest intensity observed in
/// the sample is treated as background and removed, so every mass group
/// contains at least one exact zero and no negative values.
pub fn subtract_background(sample: &RoundedSample) -> Vec<f64> {
    let mut minima: BTreeMap<i64, f64> = BTreeMap::new();

    for (i, &mass) in sample.rounded_mass.iter().enumerate() {
        let entry = minima.entry(mass).or_insert(f64::INFINITY);
        *entry = entry.min(sample.intensity[i]);
    }

    sample
        .rounded_mass
        .iter()
        .zip(sample.intensity.iter())
        .map(|(mass, &intensity)| intensity - minima[mass])
        .collect()
}

/// Min-max scales a column into `[0, 1]` over its full extent.
///
/// A constant column (including a single value) has zero range, where
/// min-max scaling is undefined; all values map to 0.0 in that case.
pub fn scale_intensity(values: &[f64]) -> Vec<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 || values.is_empty() {
        return vec![0.0; values.len()];
    }

    values.iter().map(|&v| (v - min) / range).collect()
}

/// Preprocesses one raw sample into its scaled form.
///
/// Applies, in order: rounding and duplicate aggregation with
/// carrier-gas and cutoff filtering, per-mass background subtraction,
/// and sample-wide min-max intensity scaling. Pure and deterministic;
/// an empty sample flows through as an empty `ScaledSample`.
///
/// # Arguments
///
/// * `sample` - The raw sample table.
/// * `config` - Preprocessing parameters.
///
/// # Example
///
/// ```rust
/// # use msgc::data::sample::RawSample;
/// # use msgc::algorithm::preprocessing::{preprocess_sample, PreprocessConfig};
/// let sample = RawSample::new(vec![1.0, 1.0], vec![28.2, 28.6], vec![10.0, 20.0]);
/// let scaled = preprocess_sample(&sample, &PreprocessConfig::default());
/// assert_eq!(scaled.rounded_mass, vec![28, 29]);
/// ```
pub fn preprocess_sample(sample: &RawSample, config: &PreprocessConfig) -> ScaledSample {
    let rounded = round_and_filter(sample, config.mass_cutoff);
    let intensity_minsub = subtract_background(&rounded);
    let int_minsub_scaled = scale_intensity(&intensity_minsub);

    ScaledSample::new(
        rounded.time,
        rounded.rounded_mass,
        rounded.intensity,
        intensity_minsub,
        int_minsub_scaled,
    )
}

/// Preprocesses many samples in parallel.
///
/// Each sample's pipeline is independent and side-effect-free, so the
/// batch is embarrassingly parallel; output order matches input order.
pub fn preprocess_batch(samples: &[RawSample], config: &PreprocessConfig) -> Vec<ScaledSample> {
    let scaled: Vec<ScaledSample> = samples
        .par_iter()
        .map(|sample| preprocess_sample(sample, config))
        .collect();

    debug!("preprocessed {} samples", scaled.len());

    scaled
}
