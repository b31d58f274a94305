//! Contrast battery: condition averages, pooled slopes and differences,
//! evaluated per subject for one fROI.

use std::collections::HashMap;

use crate::config::{ContrastSpec, ExperimentSpec, Named, SeriesTerm};
use crate::error::{AnalysisError, AnalysisResult};
use crate::math::ols::{FitError, OlsFit, fit_shared_design};
use crate::math::scale::LengthScale;
use crate::matrix::{FroiMatrices, SubjectByLengthMatrix};

#[derive(Debug, Clone, PartialEq)]
pub struct ContrastColumn {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FroiContrasts {
    pub froi: String,
    pub subjects: Vec<String>,
    /// Per-length effect columns (`C01`, `J12`, ...).
    pub raw: Vec<ContrastColumn>,
    /// Battery columns in battery order.
    pub contrasts: Vec<ContrastColumn>,
}

impl FroiContrasts {
    pub fn column_names(&self) -> Vec<&str> {
        self.raw
            .iter()
            .chain(&self.contrasts)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.raw
            .iter()
            .chain(&self.contrasts)
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }
}

/// Per-subject OLS of one series against mapped length.
pub fn series_fit(matrix: &SubjectByLengthMatrix, scale: &LengthScale) -> AnalysisResult<OlsFit> {
    let positions = scale.positions(&matrix.lengths)?;
    let columns: Vec<&[f64]> = matrix.columns.iter().map(|c| c.as_slice()).collect();
    fit_shared_design(&positions, &columns).map_err(|e| fit_error(e, &matrix.series, &matrix.froi))
}

pub fn compute_froi(
    froi: &FroiMatrices,
    experiment: &ExperimentSpec,
    battery: &[&ContrastSpec],
    scale: &LengthScale,
) -> AnalysisResult<FroiContrasts> {
    let mut raw = Vec::new();
    for matrix in &froi.series {
        let Some(spec) = experiment.series(&matrix.series) else {
            continue;
        };
        for (j, &length) in matrix.lengths.iter().enumerate() {
            raw.push(ContrastColumn {
                name: spec.column_name(length),
                values: matrix.columns[j].clone(),
            });
        }
    }

    let mut contrasts: Vec<ContrastColumn> = Vec::with_capacity(battery.len());
    let mut index: HashMap<String, (bool, usize)> = HashMap::new();
    for (i, c) in raw.iter().enumerate() {
        index.insert(c.name.clone(), (true, i));
    }

    for spec in battery {
        let values = match spec {
            ContrastSpec::Mean { name, terms } => {
                let cols = gather(froi, experiment, name, terms)?;
                uniform_mean(&cols, froi.subjects.len())
            }
            ContrastSpec::Slope { name, terms } => {
                let cols = gather(froi, experiment, name, terms)?;
                pooled_slope(&cols, terms, &froi.froi, scale)?
            }
            ContrastSpec::Difference {
                name,
                minuend,
                subtrahend,
            } => {
                let a = lookup(&raw, &contrasts, &index, minuend, name, &froi.froi)?;
                let b = lookup(&raw, &contrasts, &index, subtrahend, name, &froi.froi)?;
                a.iter().zip(b).map(|(x, y)| x - y).collect()
            }
        };
        index.insert(spec.name().to_string(), (false, contrasts.len()));
        contrasts.push(ContrastColumn {
            name: spec.name().to_string(),
            values,
        });
    }

    Ok(FroiContrasts {
        froi: froi.froi.clone(),
        subjects: froi.subjects.clone(),
        raw,
        contrasts,
    })
}

struct SelectedColumn<'a> {
    length: u32,
    values: &'a [f64],
}

fn gather<'a>(
    froi: &'a FroiMatrices,
    experiment: &ExperimentSpec,
    contrast: &str,
    terms: &[SeriesTerm],
) -> AnalysisResult<Vec<SelectedColumn<'a>>> {
    let mut out = Vec::new();
    for term in terms {
        let matrix = froi
            .matrix(&term.series)
            .ok_or_else(|| AnalysisError::MissingColumn {
                contrast: contrast.to_string(),
                column: term.series.clone(),
                froi: froi.froi.clone(),
            })?;
        let lengths: &[u32] = term.lengths.as_deref().unwrap_or(&matrix.lengths);
        for &length in lengths {
            let values = matrix
                .column(length)
                .ok_or_else(|| AnalysisError::MissingColumn {
                    contrast: contrast.to_string(),
                    column: experiment
                        .series(&term.series)
                        .map(|s| s.column_name(length))
                        .unwrap_or_else(|| format!("{}:{}", term.series, length)),
                    froi: froi.froi.clone(),
                })?;
            out.push(SelectedColumn { length, values });
        }
    }
    Ok(out)
}

fn uniform_mean(cols: &[SelectedColumn<'_>], n_subjects: usize) -> Vec<f64> {
    let w = 1.0 / cols.len() as f64;
    (0..n_subjects)
        .map(|i| cols.iter().map(|c| w * c.values[i]).sum())
        .collect()
}

fn pooled_slope(
    cols: &[SelectedColumn<'_>],
    terms: &[SeriesTerm],
    froi: &str,
    scale: &LengthScale,
) -> AnalysisResult<Vec<f64>> {
    let positions = cols
        .iter()
        .map(|c| scale.position(c.length))
        .collect::<AnalysisResult<Vec<f64>>>()?;
    let columns: Vec<&[f64]> = cols.iter().map(|c| c.values).collect();
    let label = terms
        .iter()
        .map(|t| t.series.as_str())
        .collect::<Vec<_>>()
        .join("+");
    let fit = fit_shared_design(&positions, &columns).map_err(|e| fit_error(e, &label, froi))?;
    Ok(fit.slopes)
}

fn lookup<'a>(
    raw: &'a [ContrastColumn],
    contrasts: &'a [ContrastColumn],
    index: &HashMap<String, (bool, usize)>,
    column: &str,
    contrast: &str,
    froi: &str,
) -> AnalysisResult<&'a [f64]> {
    match index.get(column) {
        Some(&(true, i)) => Ok(&raw[i].values),
        Some(&(false, i)) => Ok(&contrasts[i].values),
        None => Err(AnalysisError::MissingColumn {
            contrast: contrast.to_string(),
            column: column.to_string(),
            froi: froi.to_string(),
        }),
    }
}

fn fit_error(err: FitError, series: &str, froi: &str) -> AnalysisError {
    let got = match err {
        FitError::Underdetermined { distinct } => distinct,
        FitError::ShapeMismatch | FitError::Singular => 0,
    };
    AnalysisError::UnderdeterminedFit {
        series: series.to_string(),
        froi: froi.to_string(),
        got,
    }
}
