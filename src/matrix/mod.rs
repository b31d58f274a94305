//! Subjects x lengths matrices per (series, fROI).

use crate::config::{ExperimentSpec, SeriesSpec};
use crate::error::{AnalysisError, AnalysisResult};

/// One decoded measurement that survived network and series filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub subject: String,
    pub froi: String,
    pub series: String,
    pub length: u32,
    pub effect_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectByLengthMatrix {
    pub series: String,
    pub froi: String,
    pub subjects: Vec<String>,
    /// Lengths that had rows, ascending.
    pub lengths: Vec<u32>,
    /// `columns[j][i]` is subject `i` at `lengths[j]`.
    pub columns: Vec<Vec<f64>>,
}

impl SubjectByLengthMatrix {
    pub fn column(&self, length: u32) -> Option<&[f64]> {
        self.lengths
            .iter()
            .position(|&l| l == length)
            .map(|j| self.columns[j].as_slice())
    }

    pub fn row(&self, subject: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[subject]).collect()
    }
}

/// Every series of one fROI, sharing a single subject order.
#[derive(Debug, Clone, PartialEq)]
pub struct FroiMatrices {
    pub froi: String,
    pub subjects: Vec<String>,
    pub series: Vec<SubjectByLengthMatrix>,
}

impl FroiMatrices {
    pub fn matrix(&self, series: &str) -> Option<&SubjectByLengthMatrix> {
        self.series.iter().find(|m| m.series == series)
    }
}

/// Builds the matrix for one series in one fROI.
///
/// Lengths are visited in the series' ascending order; a length without
/// rows is skipped. The first non-empty length fixes the subject order and
/// every later length must carry exactly the same subjects.
pub fn build_matrix(
    observations: &[Observation],
    series: &SeriesSpec,
    froi: &str,
) -> AnalysisResult<SubjectByLengthMatrix> {
    let mut subjects: Option<Vec<String>> = None;
    let mut lengths = Vec::new();
    let mut columns = Vec::new();

    for &length in &series.lengths {
        let mut rows: Vec<(&str, f64)> = observations
            .iter()
            .filter(|o| o.series == series.name && o.froi == froi && o.length == length)
            .map(|o| (o.subject.as_str(), o.effect_size))
            .collect();
        if rows.is_empty() {
            continue;
        }
        rows.sort_by(|a, b| a.0.cmp(b.0));

        if let Some(dup) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(AnalysisError::DuplicateRecord {
                subject: dup[0].0.to_string(),
                series: series.name.clone(),
                length,
                froi: froi.to_string(),
            });
        }

        match &subjects {
            None => {
                subjects = Some(rows.iter().map(|(s, _)| s.to_string()).collect());
            }
            Some(anchor) => {
                if !same_subjects(anchor, &rows) {
                    return Err(AnalysisError::Alignment {
                        series: series.name.clone(),
                        froi: froi.to_string(),
                        detail: describe_divergence(anchor, &rows, lengths[0], length),
                    });
                }
            }
        }

        lengths.push(length);
        columns.push(rows.into_iter().map(|(_, v)| v).collect());
    }

    let Some(subjects) = subjects else {
        return Err(AnalysisError::EmptySeries {
            series: series.name.clone(),
            froi: froi.to_string(),
        });
    };

    Ok(SubjectByLengthMatrix {
        series: series.name.clone(),
        froi: froi.to_string(),
        subjects,
        lengths,
        columns,
    })
}

/// Builds every series of `experiment` for one fROI and checks that they
/// agree on subjects, since cross-series contrasts are elementwise.
pub fn build_froi_matrices(
    observations: &[Observation],
    experiment: &ExperimentSpec,
    froi: &str,
) -> AnalysisResult<FroiMatrices> {
    let mut series = Vec::with_capacity(experiment.series.len());
    for spec in &experiment.series {
        series.push(build_matrix(observations, spec, froi)?);
    }

    let Some(anchor) = series.first() else {
        return Err(AnalysisError::EmptySeries {
            series: experiment.name.clone(),
            froi: froi.to_string(),
        });
    };
    let subjects = anchor.subjects.clone();
    for m in series.iter().skip(1) {
        if m.subjects != subjects {
            return Err(AnalysisError::Alignment {
                series: m.series.clone(),
                froi: froi.to_string(),
                detail: format!(
                    "{} subjects differ from series {} ({} vs {})",
                    m.series,
                    anchor.series,
                    m.subjects.len(),
                    subjects.len()
                ),
            });
        }
    }

    Ok(FroiMatrices {
        froi: froi.to_string(),
        subjects,
        series,
    })
}

fn same_subjects(anchor: &[String], rows: &[(&str, f64)]) -> bool {
    anchor.len() == rows.len() && anchor.iter().zip(rows).all(|(a, (s, _))| a == s)
}

fn describe_divergence(anchor: &[String], rows: &[(&str, f64)], first: u32, length: u32) -> String {
    let missing = anchor
        .iter()
        .find(|a| !rows.iter().any(|(s, _)| s == a));
    let extra = rows
        .iter()
        .map(|(s, _)| *s)
        .find(|s| !anchor.iter().any(|a| a == s));
    let mut detail = format!(
        "length {} has {} subjects, length {} has {}",
        first,
        anchor.len(),
        length,
        rows.len()
    );
    if let Some(s) = missing {
        detail.push_str(&format!("; '{}' missing at length {}", s, length));
    }
    if let Some(s) = extra {
        detail.push_str(&format!("; '{}' absent at length {}", s, first));
    }
    detail
}
