//! Significance tables built from contrast CSVs.
//!
//! Each (parcel set, experiment, contrast, fROI) cell gets a one-sample
//! t-test against zero; the aggregate fROI `all` tests the per-subject
//! network mean. p-values are FDR-corrected within
//! (parcel set, experiment, network key, contrast).

pub mod effect_test;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::config::{Named, ParcelSet, StudyConfig};
use crate::io::contrast_table::{ContrastTable, read_contrast_table};
use crate::math::fdr::{FdrMethod, fdr_correct, stars};
use crate::math::stats::ttest_1samp;

pub const AGGREGATE_FROI: &str = "all";
pub const INDIVIDUAL_KEY: &str = "Ind";

#[derive(Debug, Clone, PartialEq)]
pub struct SignifRow {
    pub parcel_set: String,
    pub experiment: String,
    pub contrast: String,
    pub froi: String,
    pub conv: String,
    pub sing: String,
    pub beta: f64,
    pub se: f64,
    pub t: f64,
    pub p: f64,
    pub p_fdr: f64,
    pub signif: String,
}

impl SignifRow {
    pub fn network_key(&self) -> &str {
        network_key(&self.froi)
    }
}

/// `all` for the whole-network fROI, one shared bucket for the rest.
pub fn network_key(froi: &str) -> &str {
    if froi == AGGREGATE_FROI {
        AGGREGATE_FROI
    } else {
        INDIVIDUAL_KEY
    }
}

pub fn contrast_file_name(parcel_set: &str, experiment: &str) -> String {
    format!("{}_{}_contrasts.csv", parcel_set, experiment)
}

/// Contrast tables present under `dir` for the configured units, in
/// configuration order.
pub fn discover_tables(study: &StudyConfig, dir: &Path) -> Vec<(String, String, PathBuf)> {
    let mut out = Vec::new();
    for ps in &study.parcel_sets {
        for exp in &study.experiments {
            let path = dir.join(contrast_file_name(&ps.name, &exp.name));
            if path.is_file() {
                out.push((ps.name.clone(), exp.name.clone(), path));
            }
        }
    }
    out
}

pub fn missing_tables_error(dir: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "contrast files not found in {}; run `nlength contrasts` first",
        dir.display()
    )
}

/// Per-subject mean over the network fROIs, restricted to subjects that
/// appear in every one of them.
pub fn network_mean(table: &ContrastTable, network: &[&str], column: usize) -> Vec<f64> {
    let Some(first) = network.first() else {
        return Vec::new();
    };
    let per_froi: Vec<HashMap<&str, f64>> = network
        .iter()
        .map(|f| table.values(f, column).into_iter().collect())
        .collect();
    table
        .values(first, column)
        .into_iter()
        .filter_map(|(subject, _)| {
            let vals: Option<Vec<f64>> = per_froi.iter().map(|m| m.get(subject).copied()).collect();
            vals.map(|v| v.iter().sum::<f64>() / v.len() as f64)
        })
        .collect()
}

/// t-test rows for one contrast table.
pub fn ttest_rows(
    parcel_set: &ParcelSet,
    experiment: &str,
    contrasts: &[String],
    table: &ContrastTable,
) -> (Vec<SignifRow>, Vec<String>) {
    let mut rows = Vec::new();
    let mut warnings = Vec::new();

    let present = table.frois();
    let network: Vec<&str> = parcel_set
        .network
        .iter()
        .map(|f| f.as_str())
        .filter(|f| present.contains(f))
        .collect();
    if network.len() != parcel_set.network.len() {
        warnings.push(format!(
            "{}_{}: {} of {} network fROIs present",
            parcel_set.name,
            experiment,
            network.len(),
            parcel_set.network.len()
        ));
    }

    for contrast in contrasts {
        let Some(col) = table.column_index(contrast) else {
            warnings.push(format!(
                "{}_{}: contrast column {} missing",
                parcel_set.name, experiment, contrast
            ));
            continue;
        };

        let mut cells: Vec<(String, Vec<f64>)> = Vec::with_capacity(network.len() + 1);
        cells.push((AGGREGATE_FROI.to_string(), network_mean(table, &network, col)));
        for froi in &network {
            let values = table.values(froi, col).into_iter().map(|(_, v)| v).collect();
            cells.push((froi.to_string(), values));
        }

        for (froi, values) in cells {
            match ttest_1samp(&values) {
                Some(tt) => rows.push(SignifRow {
                    parcel_set: parcel_set.name.clone(),
                    experiment: experiment.to_string(),
                    contrast: contrast.clone(),
                    froi,
                    conv: "t".to_string(),
                    sing: "f".to_string(),
                    beta: tt.mean,
                    se: tt.se,
                    t: tt.t,
                    p: tt.p,
                    p_fdr: f64::NAN,
                    signif: String::new(),
                }),
                None => warnings.push(format!(
                    "{}_{}: {} in {} not testable (n={})",
                    parcel_set.name,
                    experiment,
                    contrast,
                    froi,
                    values.len()
                )),
            }
        }
    }

    (rows, warnings)
}

/// Fills `p_fdr` and `signif` within each correction family.
pub fn apply_fdr(rows: &mut [SignifRow], method: FdrMethod) {
    let mut groups: BTreeMap<(String, String, String, String), Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let key = (
            row.parcel_set.clone(),
            row.experiment.clone(),
            row.network_key().to_string(),
            row.contrast.clone(),
        );
        groups.entry(key).or_default().push(i);
    }
    for members in groups.values() {
        let pvals: Vec<f64> = members.iter().map(|&i| rows[i].p).collect();
        let adjusted = fdr_correct(&pvals, method);
        for (&i, p_fdr) in members.iter().zip(adjusted) {
            rows[i].p_fdr = p_fdr;
            rows[i].signif = stars(p_fdr).to_string();
        }
    }
}

/// Report rounding: two decimals for beta/se/t, p-values floored at 0.001
/// and kept to three decimals.
pub fn round_for_report(row: &mut SignifRow) {
    row.beta = round_to(row.beta, 2);
    row.se = round_to(row.se, 2);
    row.t = round_to(row.t, 2);
    row.p = round_to(row.p.max(0.001), 3);
    row.p_fdr = round_to(row.p_fdr.max(0.001), 3);
}

/// Halves round to even, matching the numpy rounding the published tables
/// were made with (0.125 -> 0.12).
fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round_ties_even() / f
}

/// Parcel-set order, experiment order, contrast, then `all` followed by
/// the parcel set's fROI order.
pub fn sort_rows(rows: &mut [SignifRow], study: &StudyConfig) {
    let froi_rank = |row: &SignifRow| -> (usize, String) {
        if row.froi == AGGREGATE_FROI {
            return (0, String::new());
        }
        let rank = study
            .parcel_set(&row.parcel_set)
            .and_then(|ps| ps.froi_rank(&row.froi))
            .map(|r| r + 1)
            .unwrap_or(usize::MAX);
        (rank, row.froi.clone())
    };
    rows.sort_by(|a, b| {
        (
            study.parcel_set_rank(&a.parcel_set),
            study.experiment_rank(&a.experiment),
            &a.parcel_set,
            &a.experiment,
            &a.contrast,
            froi_rank(a),
        )
            .cmp(&(
                study.parcel_set_rank(&b.parcel_set),
                study.experiment_rank(&b.experiment),
                &b.parcel_set,
                &b.experiment,
                &b.contrast,
                froi_rank(b),
            ))
    });
}

/// Imported rows take the place of computed rows for the same
/// (parcel set, experiment, contrast, fROI) cell. Returns how many computed
/// rows were replaced.
pub fn replace_with_imported(rows: &mut Vec<SignifRow>, imported: Vec<SignifRow>) -> usize {
    let keys: HashSet<(&str, &str, &str, &str)> = imported
        .iter()
        .map(|r| {
            (
                r.parcel_set.as_str(),
                r.experiment.as_str(),
                r.contrast.as_str(),
                r.froi.as_str(),
            )
        })
        .collect();
    let before = rows.len();
    rows.retain(|r| {
        !keys.contains(&(
            r.parcel_set.as_str(),
            r.experiment.as_str(),
            r.contrast.as_str(),
            r.froi.as_str(),
        ))
    });
    let replaced = before - rows.len();
    drop(keys);
    rows.extend(imported);
    replaced
}

/// Full significance table: t-tests over every contrast table found in
/// `contrasts_dir` plus imported rows, corrected, sorted and rounded.
pub fn build_significance(
    study: &StudyConfig,
    contrasts_dir: &Path,
    imported: Vec<SignifRow>,
    method: FdrMethod,
) -> Result<Vec<SignifRow>> {
    let tables = discover_tables(study, contrasts_dir);
    if tables.is_empty() && imported.is_empty() {
        return Err(missing_tables_error(contrasts_dir));
    }

    let mut rows = Vec::new();
    for (ps_name, exp_name, path) in &tables {
        let (Some(ps), Some(exp)) = (study.parcel_set(ps_name), study.experiment(exp_name)) else {
            continue;
        };
        let table = read_contrast_table(path)?;
        let contrasts: Vec<String> = exp
            .applicable_contrasts(&study.contrasts)
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let (unit_rows, warnings) = ttest_rows(ps, exp_name, &contrasts, &table);
        for w in warnings {
            warn!("{}", w);
        }
        info!(
            parcel_set = %ps_name,
            experiment = %exp_name,
            rows = unit_rows.len(),
            "contrast table tested"
        );
        rows.extend(unit_rows);
    }

    if !imported.is_empty() {
        let replaced = replace_with_imported(&mut rows, imported);
        info!(replaced, "imported significance rows");
    }

    if rows.is_empty() {
        bail!("no testable contrasts in {}", contrasts_dir.display());
    }

    apply_fdr(&mut rows, method);
    sort_rows(&mut rows, study);
    for row in rows.iter_mut() {
        round_for_report(row);
    }
    Ok(rows)
}
