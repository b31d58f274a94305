//! Single-contrast report across every parcel set, experiment and fROI
//! (the sentences-vs-nonwords check), corrected as one FDR family.

use std::path::Path;

use anyhow::{Result, bail};
use tracing::warn;

use crate::config::StudyConfig;
use crate::io::contrast_table::read_contrast_table;
use crate::math::fdr::{FdrMethod, fdr_correct};
use crate::math::stats::ttest_1samp;
use crate::signif::{discover_tables, missing_tables_error};

#[derive(Debug, Clone, PartialEq)]
pub struct EffectTestRow {
    pub parcel_set: String,
    pub experiment: String,
    pub froi: String,
    pub n: usize,
    pub t: f64,
    pub p: f64,
    pub d: f64,
    pub p_fdr: f64,
}

pub fn effect_test(study: &StudyConfig, contrasts_dir: &Path, contrast: &str) -> Result<Vec<EffectTestRow>> {
    let tables = discover_tables(study, contrasts_dir);
    if tables.is_empty() {
        return Err(missing_tables_error(contrasts_dir));
    }

    let mut rows = Vec::new();
    for (ps_name, exp_name, path) in &tables {
        let table = read_contrast_table(path)?;
        let Some(col) = table.column_index(contrast) else {
            continue;
        };
        let Some(ps) = study.parcel_set(ps_name) else {
            continue;
        };
        let present = table.frois();
        for froi in ps.network.iter().filter(|f| present.contains(&f.as_str())) {
            let values: Vec<f64> = table.values(froi, col).into_iter().map(|(_, v)| v).collect();
            match ttest_1samp(&values) {
                Some(tt) => rows.push(EffectTestRow {
                    parcel_set: ps_name.clone(),
                    experiment: exp_name.clone(),
                    froi: froi.clone(),
                    n: tt.n,
                    t: tt.t,
                    p: tt.p,
                    d: tt.d,
                    p_fdr: f64::NAN,
                }),
                None => warn!(
                    parcel_set = %ps_name,
                    experiment = %exp_name,
                    froi = %froi,
                    n = values.len(),
                    "contrast not testable"
                ),
            }
        }
    }

    if rows.is_empty() {
        bail!(
            "contrast {} not found in any table under {}",
            contrast,
            contrasts_dir.display()
        );
    }

    let pvals: Vec<f64> = rows.iter().map(|r| r.p).collect();
    for (row, p_fdr) in rows.iter_mut().zip(fdr_correct(&pvals, FdrMethod::Negcorr)) {
        row.p_fdr = p_fdr;
    }
    Ok(rows)
}
