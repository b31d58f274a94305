//! Descriptive statistics and the one-sample t-test.
//!
//! Note: inputs containing NaN propagate NaN; callers reject NaN earlier.

use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

pub fn sem(values: &[f64]) -> f64 {
    sample_std(values) / (values.len() as f64).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub n: usize,
    pub mean: f64,
    pub se: f64,
    pub t: f64,
    pub df: f64,
    /// Two-sided.
    pub p: f64,
    /// Cohen's d against zero (mean / sample sd).
    pub d: f64,
}

/// Two-sided one-sample t-test of `values` against zero. `None` when the
/// statistic is undefined (fewer than two values or zero variance).
pub fn ttest_1samp(values: &[f64]) -> Option<TTest> {
    let n = values.len();
    if n < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let m = mean(values);
    let sd = sample_std(values);
    if sd == 0.0 || !sd.is_finite() {
        return None;
    }
    let se = sd / (n as f64).sqrt();
    let t = m / se;
    let df = (n - 1) as f64;
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = (2.0 * dist.sf(t.abs())).min(1.0);
    Some(TTest {
        n,
        mean: m,
        se,
        t,
        df,
        p,
        d: m / sd,
    })
}
