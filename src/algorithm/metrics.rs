use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Probability clipping bound keeping log terms finite.
const CLIP_EPS: f64 = 1e-15;

/// A table with one named column per class.
///
/// Used both for ground-truth membership indicators (0/1) and for
/// predicted probabilities; rows are aligned 1:1 between the two.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassTable {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl ClassTable {
    pub fn new(labels: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        ClassTable { labels, values }
    }

    /// Returns the column for a class label, if present.
    ///
    /// A label beyond the value columns of a ragged table yields `None`
    /// rather than a panic; [`aggregated_log_loss`] rejects such tables
    /// up front.
    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|i| self.values.get(i))
            .map(|v| v.as_slice())
    }

    fn is_ragged(&self) -> bool {
        self.labels.len() != self.values.len()
    }
}

/// Binary log loss between membership indicators and probabilities.
///
/// Probabilities are clipped to `[1e-15, 1 - 1e-15]` so a confident but
/// wrong prediction yields a large finite loss instead of infinity.
fn binary_log_loss(y_true: &[f64], y_prob: &[f64]) -> f64 {
    let total: f64 = y_true
        .iter()
        .zip(y_prob.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(CLIP_EPS, 1.0 - CLIP_EPS);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / y_true.len() as f64
}

/// Computes the mean per-class binary log loss.
///
/// For each class column of `y_pred`, the standard clipped binary log
/// loss is computed against the matching `y_true` column; the result is
/// the arithmetic mean across classes.
///
/// # Arguments
///
/// * `y_true` - Ground-truth table, one 0/1 membership column per class.
/// * `y_pred` - Predicted-probability table; its labels must be a subset
///   of `y_true`'s and its rows aligned 1:1.
///
/// # Errors
///
/// * `Error::EmptyInput` if `y_pred` has no columns or no rows.
/// * `Error::ColumnMismatch` if a predicted label is absent from
///   `y_true`, the row counts disagree, or either table has a label
///   count that disagrees with its value column count.
/// * `Error::DegenerateLabels` if a true column has one unique value,
///   where log loss is trivial.
pub fn aggregated_log_loss(y_true: &ClassTable, y_pred: &ClassTable) -> Result<f64, Error> {
    if y_true.is_ragged() || y_pred.is_ragged() {
        return Err(Error::ColumnMismatch(
            "label and value column counts disagree".to_string(),
        ));
    }
    if y_pred.labels.is_empty() || y_pred.values.iter().all(|c| c.is_empty()) {
        return Err(Error::EmptyInput);
    }

    let mut losses = Vec::with_capacity(y_pred.labels.len());

    for (label, predicted) in y_pred.labels.iter().zip(y_pred.values.iter()) {
        let truth = y_true
            .column(label)
            .ok_or_else(|| Error::ColumnMismatch(format!("class {label} missing from labels")))?;

        if truth.len() != predicted.len() {
            return Err(Error::ColumnMismatch(format!(
                "class {label}: {} label rows vs {} prediction rows",
                truth.len(),
                predicted.len()
            )));
        }
        if truth.is_empty() {
            return Err(Error::EmptyInput);
        }

        let first = truth[0];
        if truth.iter().all(|&y| y == first) {
            return Err(Error::DegenerateLabels(label.clone()));
        }

        losses.push(binary_log_loss(truth, predicted));
    }

    Ok(losses.iter().sum::<f64>() / losses.len() as f64)
}
