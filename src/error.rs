/// Errors raised by the preprocessing, feature engineering, metric and
/// visualization helpers.
///
/// All errors are raised synchronously at the call that detects them;
/// there is no retry and no partial output. Batch callers are expected
/// to catch and skip failed samples.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input table has zero rows where at least one is required
    #[error("input has no rows")]
    EmptyInput,

    /// Required column absent from an input file header
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Prediction and label tables disagree on columns or row counts
    #[error("column mismatch between labels and predictions: {0}")]
    ColumnMismatch(String),

    /// A true-label class column has only one unique value
    #[error("degenerate labels for class {0}: log loss is undefined")]
    DegenerateLabels(String),

    /// Grid layout parameters cannot produce a valid panel arrangement
    #[error("invalid grid layout: {0}")]
    InvalidGridLayout(String),

    /// Chart backend failure
    #[error("plotting failed: {0}")]
    Plot(String),

    /// I/O error reading a sample file
    #[error("failed to read sample file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}
