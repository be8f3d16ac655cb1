use crate::engine::{Value, ValueType};
use crate::error::ScalargradError;
use itertools::Itertools;

/// Rescales `values` into probabilities (each in (0, 1), summing to 1).
/// A single-element input always maps to `[1.0]`; relative order is
/// preserved.
pub fn softmax(values: &[Value]) -> Vec<Value> {
    let exps: Vec<Value> = values.iter().map(|v| v.exp()).collect();
    let total: Value = exps.iter().cloned().sum();
    exps.into_iter().map(|e| e / total.clone()).collect()
}

/// Mean negative log-likelihood of `predictions` (probabilities) against
/// `targets`. Probabilities that can reach exactly 0 are the caller's
/// problem: offset them with an epsilon before calling, or the log goes
/// non-finite.
pub fn cross_entropy(
    predictions: &[Value],
    targets: &[Value],
) -> Result<Value, ScalargradError> {
    check_lengths(predictions, targets)?;
    Ok(negative_log_likelihood(predictions, targets))
}

/// Mean negative log-likelihood with raw outputs interpreted as logits.
/// Factoring out `ln(sum of exps)` skips the per-element softmax and its
/// log round-trip; for one-hot targets this equals
/// `cross_entropy(softmax(logits), targets)`.
pub fn cross_entropy_with_logits(
    logits: &[Value],
    targets: &[Value],
) -> Result<Value, ScalargradError> {
    check_lengths(logits, targets)?;

    let log_sum_exps = logits.iter().map(|l| l.exp()).sum::<Value>().log();
    let total: Value = targets
        .iter()
        .zip_eq(logits)
        .map(|(t, l)| t.clone() * (l.clone() - log_sum_exps.clone()))
        .sum();

    Ok(-total / targets.len() as ValueType)
}

/// Negative log-likelihood of a single probability against a binary target:
/// the cross-entropy of `[p, 1-p]` vs `[t, 1-t]`. Alternative to a
/// two-output softmax head for binary classification.
pub fn binary_cross_entropy(prediction: &Value, target: &Value) -> Value {
    let predictions = [prediction.clone(), 1.0 - prediction.clone()];
    let targets = [target.clone(), 1.0 - target.clone()];
    negative_log_likelihood(&predictions, &targets)
}

// Callers have validated the lengths already.
fn negative_log_likelihood(predictions: &[Value], targets: &[Value]) -> Value {
    let total: Value = targets
        .iter()
        .zip_eq(predictions)
        .map(|(t, p)| t.clone() * p.log())
        .sum();
    -total / targets.len() as ValueType
}

fn check_lengths(predictions: &[Value], targets: &[Value]) -> Result<(), ScalargradError> {
    if predictions.len() != targets.len() {
        return Err(ScalargradError::ShapeMismatch {
            expected: targets.len(),
            actual: predictions.len(),
        });
    }
    Ok(())
}
