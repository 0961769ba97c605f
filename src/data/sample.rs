use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Raw detector readings for a single sample.
///
/// Columnar layout: `time`, `mass` and `intensity` are parallel vectors,
/// one entry per detector reading. No sort order is required and
/// duplicate `(time, mass)` pairs may occur.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawSample {
    /// Retention time in seconds
    pub time: Vec<f64>,
    /// Mass-to-charge ratio, possibly fractional
    pub mass: Vec<f64>,
    /// Ion abundance
    pub intensity: Vec<f64>,
}

impl RawSample {
    /// Constructs a new `RawSample` from parallel columns.
    ///
    /// # Arguments
    ///
    /// * `time` - A vector of retention times in seconds.
    /// * `mass` - A vector of m/z values corresponding to the times.
    /// * `intensity` - A vector of abundances corresponding to the times.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use msgc::data::sample::RawSample;
    /// let sample = RawSample::new(vec![1.0, 1.0], vec![28.2, 28.6], vec![10.0, 20.0]);
    /// assert_eq!(sample.len(), 2);
    /// ```
    pub fn new(time: Vec<f64>, mass: Vec<f64>, intensity: Vec<f64>) -> Self {
        RawSample { time, mass, intensity }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Returns the readings recorded at exactly the given timestamp.
    pub fn at_time(&self, timestamp: f64) -> RawSample {
        let mut time = Vec::new();
        let mut mass = Vec::new();
        let mut intensity = Vec::new();

        for (i, &t) in self.time.iter().enumerate() {
            if t == timestamp {
                time.push(t);
                mass.push(self.mass[i]);
                intensity.push(self.intensity[i]);
            }
        }
        RawSample::new(time, mass, intensity)
    }
}

/// A sample after m/z rounding and duplicate aggregation.
///
/// One row per unique `(time, rounded_mass)` pair, `intensity` holding
/// the mean abundance of the aggregated raw readings, rows ordered by
/// `(time, rounded_mass)` ascending.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundedSample {
    pub time: Vec<f64>,
    pub rounded_mass: Vec<i64>,
    pub intensity: Vec<f64>,
}

impl RoundedSample {
    pub fn new(time: Vec<f64>, rounded_mass: Vec<i64>, intensity: Vec<f64>) -> Self {
        RoundedSample { time, rounded_mass, intensity }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// A fully preprocessed sample.
///
/// Extends [`RoundedSample`] with the background-subtracted abundance
/// (`intensity_minsub`, minimum per rounded mass removed) and its
/// sample-wide min-max rescaling (`int_minsub_scaled`, in `[0, 1]`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScaledSample {
    pub time: Vec<f64>,
    pub rounded_mass: Vec<i64>,
    pub intensity: Vec<f64>,
    pub intensity_minsub: Vec<f64>,
    pub int_minsub_scaled: Vec<f64>,
}

impl ScaledSample {
    pub fn new(
        time: Vec<f64>,
        rounded_mass: Vec<i64>,
        intensity: Vec<f64>,
        intensity_minsub: Vec<f64>,
        int_minsub_scaled: Vec<f64>,
    ) -> Self {
        ScaledSample {
            time,
            rounded_mass,
            intensity,
            intensity_minsub,
            int_minsub_scaled,
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    time: f64,
    mass: f64,
    intensity: f64,
}

const REQUIRED_COLUMNS: [&str; 3] = ["time", "mass", "intensity"];

/// Loads per-sample tables from a data directory.
///
/// Sample files are headered, comma-delimited tables with at least the
/// columns `time`, `mass` and `intensity`; extra columns are ignored.
/// Files are read fully into memory before any transformation begins.
#[derive(Clone, Debug)]
pub struct SampleSource {
    pub root: PathBuf,
}

impl SampleSource {
    /// Constructs a source rooted at the given data directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        SampleSource { root: root.as_ref().to_path_buf() }
    }

    /// Loads the sample file at `rel_path` relative to the data root.
    ///
    /// # Arguments
    ///
    /// * `rel_path` - The file path relative to the data root, as carried
    ///   in a metadata row's `features_path` field.
    ///
    /// # Returns
    ///
    /// * `RawSample` - The fully buffered sample table.
    ///
    /// # Errors
    ///
    /// * `Error::MissingColumn` if the header lacks a required column.
    /// * `Error::Csv` / `Error::Io` on malformed files.
    pub fn load_sample(&self, rel_path: &str) -> Result<RawSample, Error> {
        let path = self.root.join(rel_path);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;

        let headers = reader.headers()?.clone();
        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                return Err(Error::MissingColumn(required.to_string()));
            }
        }

        let mut time = Vec::new();
        let mut mass = Vec::new();
        let mut intensity = Vec::new();

        for record in reader.deserialize() {
            let record: RawRecord = record?;
            time.push(record.time);
            mass.push(record.mass);
            intensity.push(record.intensity);
        }

        debug!("loaded {} rows from {}", time.len(), path.display());

        Ok(RawSample::new(time, mass, intensity))
    }
}

impl Default for SampleSource {
    fn default() -> Self {
        SampleSource::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_sample(dir: &Path, name: &str, body: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_load_sample() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();
        write_sample(
            dir.path(),
            "s1.csv",
            "time,mass,intensity\n0.0,28.2,10.5\n0.5,44.1,3.0\n",
        );

        let source = SampleSource::new(dir.path());
        let sample = source.load_sample("s1.csv").unwrap();

        assert_eq!(sample.len(), 2);
        assert!((sample.time[1] - 0.5).abs() < 1e-12);
        assert!((sample.mass[0] - 28.2).abs() < 1e-12);
        assert!((sample.intensity[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_sample_extra_columns_ignored() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();
        write_sample(
            dir.path(),
            "s2.csv",
            "time,temp,mass,intensity\n1.0,35.0,18.0,7.0\n",
        );

        let source = SampleSource::new(dir.path());
        let sample = source.load_sample("s2.csv").unwrap();

        assert_eq!(sample.len(), 1);
        assert!((sample.mass[0] - 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_sample_missing_column() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path(), "s3.csv", "time,mass\n1.0,18.0\n");

        let source = SampleSource::new(dir.path());
        let result = source.load_sample("s3.csv");

        match result {
            Err(Error::MissingColumn(column)) => assert_eq!(column, "intensity"),
            Err(other) => panic!("expected MissingColumn, got {other:?}"),
            Ok(_) => panic!("expected MissingColumn, got a sample"),
        }
    }

    #[test]
    fn test_at_time() {
        let sample = RawSample::new(
            vec![1.0, 1.0, 2.0],
            vec![28.0, 32.0, 28.0],
            vec![10.0, 20.0, 30.0],
        );

        let at_one = sample.at_time(1.0);
        assert_eq!(at_one.len(), 2);
        assert!((at_one.mass[1] - 32.0).abs() < 1e-12);
    }
}
