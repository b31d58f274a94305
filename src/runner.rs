//! Runs the contrast pipeline over parcel-set x experiment units.
//!
//! Units share nothing mutable, so they may run on a rayon pool; a failing
//! unit is reported and never stops its siblings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{ExperimentSpec, ParcelSet, StudyConfig};
use crate::ctx::Ctx;
use crate::io::summary::{UnitReport, UnitStatus};
use crate::pipeline::Pipeline;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub data_path: PathBuf,
    pub out_dir: PathBuf,
    /// Empty selects every configured parcel set.
    pub parcel_sets: Vec<String>,
    /// Empty selects every configured experiment.
    pub experiments: Vec<String>,
    /// 0 lets rayon decide.
    pub threads: usize,
}

pub fn select_units<'a>(
    study: &'a StudyConfig,
    parcel_sets: &[String],
    experiments: &[String],
) -> Result<Vec<(&'a ParcelSet, &'a ExperimentSpec)>> {
    for name in parcel_sets {
        if study.parcel_set(name).is_none() {
            bail!("unknown parcel set '{}'", name);
        }
    }
    for name in experiments {
        if study.experiment(name).is_none() {
            bail!("unknown experiment '{}'", name);
        }
    }
    let mut units = Vec::new();
    for ps in &study.parcel_sets {
        if !parcel_sets.is_empty() && !parcel_sets.contains(&ps.name) {
            continue;
        }
        for exp in &study.experiments {
            if !experiments.is_empty() && !experiments.contains(&exp.name) {
                continue;
            }
            units.push((ps, exp));
        }
    }
    Ok(units)
}

pub fn run_unit(
    study: &StudyConfig,
    parcel_set: &ParcelSet,
    experiment: &ExperimentSpec,
    data_path: &Path,
    out_dir: &Path,
) -> UnitReport {
    let mut report = UnitReport {
        parcel_set: parcel_set.name.clone(),
        experiment: experiment.name.clone(),
        status: UnitStatus::Failed,
        error: None,
        contrast_file: None,
        profile_file: None,
        n_subjects: 0,
        n_frois: 0,
        contrasts: Vec::new(),
        warnings: Vec::new(),
    };

    let mut ctx = match Ctx::new(
        study,
        parcel_set,
        experiment,
        data_path.to_path_buf(),
        out_dir.to_path_buf(),
    ) {
        Ok(ctx) => ctx,
        Err(err) => {
            report.error = Some(format!("{:#}", err));
            return report;
        }
    };

    let result = Pipeline::contrasts().run(&mut ctx);
    report.warnings = ctx.warnings.clone();
    match result {
        Ok(()) => {
            report.status = UnitStatus::Ok;
            report.contrast_file = file_name(&ctx.output.contrasts_path);
            report.profile_file = file_name(&ctx.output.profile_path);
            report.n_subjects = ctx.n_subjects();
            report.n_frois = ctx.results.len();
            report.contrasts = ctx.battery_names();
            info!(unit = %ctx.unit_name(), "unit finished");
        }
        Err(err) => {
            warn!(unit = %ctx.unit_name(), error = %format!("{:#}", err), "unit failed");
            report.error = Some(format!("{:#}", err));
        }
    }
    report
}

/// Runs every selected unit. Reports come back in configuration order
/// whatever the thread count.
pub fn run_study(study: &StudyConfig, opts: &RunOptions) -> Result<Vec<UnitReport>> {
    let units = select_units(study, &opts.parcel_sets, &opts.experiments)?;
    if units.is_empty() {
        bail!("no parcel set x experiment units selected");
    }
    info!(units = units.len(), threads = opts.threads, "running units");

    if opts.threads == 1 {
        return Ok(units
            .iter()
            .map(|(ps, exp)| run_unit(study, ps, exp, &opts.data_path, &opts.out_dir))
            .collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.threads)
        .build()
        .context("failed to build thread pool")?;
    Ok(pool.install(|| {
        units
            .par_iter()
            .map(|(ps, exp)| run_unit(study, ps, exp, &opts.data_path, &opts.out_dir))
            .collect()
    }))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().to_string())
}
