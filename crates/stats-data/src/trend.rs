//! Ordinary least-squares trend over a series indexed by position.

use serde::Serialize;

/// Fitted line `y = slope · i + intercept` and its value at every index.
///
/// When fewer than two points are available (or the fit is otherwise
/// degenerate) slope, intercept and every point are `None`; callers must skip
/// absent points rather than plot them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    pub points: Vec<Option<f64>>,
}

impl TrendLine {
    pub fn is_defined(&self) -> bool {
        self.slope.is_some()
    }
}

/// Fit `values[i]` against `i` for `i` in `0..values.len()`.
pub fn fit_trend(values: &[f64]) -> TrendLine {
    let n = values.len() as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if values.len() < 2 || denominator == 0.0 {
        return TrendLine {
            slope: None,
            intercept: None,
            points: vec![None; values.len()],
        };
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    let points = (0..values.len())
        .map(|i| Some(slope * i as f64 + intercept))
        .collect();

    TrendLine {
        slope: Some(slope),
        intercept: Some(intercept),
        points,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
