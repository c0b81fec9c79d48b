//! Held-out regression metrics, reported as plain numbers.

/// Mean absolute error.
///
/// # Panics
/// If the slices differ in length or are empty.
pub fn mean_absolute_error(truth: &[f64], pred: &[f64]) -> f64 {
    check(truth, pred);
    truth
        .iter()
        .zip(pred)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / truth.len() as f64
}

/// Mean squared error.
///
/// # Panics
/// If the slices differ in length or are empty.
pub fn mean_squared_error(truth: &[f64], pred: &[f64]) -> f64 {
    check(truth, pred);
    truth
        .iter()
        .zip(pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>()
        / truth.len() as f64
}

/// Coefficient of determination. A constant truth vector has no
/// variance to explain and scores 0.
///
/// # Panics
/// If the slices differ in length or are empty.
pub fn r2_score(truth: &[f64], pred: &[f64]) -> f64 {
    check(truth, pred);
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean) * (t - mean)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = truth
        .iter()
        .zip(pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    1.0 - ss_res / ss_tot
}

fn check(truth: &[f64], pred: &[f64]) {
    assert_eq!(truth.len(), pred.len(), "truth and pred must align");
    assert!(!truth.is_empty(), "metrics need at least one sample");
}
