//! False discovery rate correction.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FdrMethod {
    /// Benjamini-Hochberg, independent or positively correlated tests.
    Indep,
    /// Benjamini-Yekutieli, valid under arbitrary (negative) dependence.
    #[default]
    Negcorr,
}

/// Adjusted p-values in input order. Adjusted values are never below the
/// raw ones, are monotone in the raw ordering and capped at 1.
pub fn fdr_correct(pvals: &[f64], method: FdrMethod) -> Vec<f64> {
    let n = pvals.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| pvals[a].total_cmp(&pvals[b]));

    let cm = match method {
        FdrMethod::Indep => 1.0,
        FdrMethod::Negcorr => (1..=n).map(|i| 1.0 / i as f64).sum::<f64>(),
    };

    // Step-up: running minimum from the largest p downwards.
    let mut adjusted = vec![0.0; n];
    let mut running = f64::INFINITY;
    for rank in (0..n).rev() {
        let idx = order[rank];
        let factor = (rank + 1) as f64 / n as f64 / cm;
        let raw = pvals[idx] / factor;
        running = running.min(raw);
        adjusted[idx] = running.min(1.0);
    }
    adjusted
}

/// Significance marker for an adjusted p-value.
pub fn stars(p: f64) -> &'static str {
    if p > 0.1 {
        ""
    } else if p > 0.05 {
        "."
    } else if p > 0.01 {
        "*"
    } else if p > 0.001 {
        "**"
    } else {
        "***"
    }
}
