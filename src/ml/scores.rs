//! Turning per-class scores into a class code.

/// Numerically stable softmax. Degenerate input spreads mass evenly.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let Some(max) = logits.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };
    let exps: Vec<f64> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / logits.len() as f64; logits.len()];
    }
    exps.into_iter().map(|v| v / sum).collect()
}

/// Code paired with the highest score. Ties keep the earlier class.
///
/// `None` when the lengths differ, the input is empty, or a score is `NaN`.
pub fn best_code(scores: &[f64], codes: &[i64]) -> Option<i64> {
    if scores.len() != codes.len() || scores.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut best: Option<(f64, i64)> = None;
    for (&score, &code) in scores.iter().zip(codes) {
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, code));
        }
    }
    best.map(|(_, code)| code)
}
