use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::config::{ContrastSpec, ExperimentSpec, Named, ParcelSet, StudyConfig};

/// User overrides layered on top of the built-in study.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudyOverlay {
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    #[serde(default)]
    pub length_scale: Option<BTreeMap<u32, f64>>,
    #[serde(default)]
    pub parcel_sets: Vec<ParcelSet>,
    #[serde(default)]
    pub experiments: Vec<ExperimentSpec>,
    #[serde(default)]
    pub contrasts: Vec<ContrastSpec>,
}

pub fn load_builtin() -> Result<StudyConfig> {
    let content = include_str!("../../assets/study_v1.json");
    let study: StudyConfig =
        serde_json::from_str(content).context("failed to parse built-in study v1")?;
    validate(&study, "built-in study v1")?;
    Ok(study)
}

pub fn load_overlay(path: &Path) -> Result<StudyOverlay> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

/// Built-in study with the optional user overlay applied and validated.
pub fn load_study(overlay: Option<&Path>) -> Result<StudyConfig> {
    let mut study = load_builtin()?;
    let Some(path) = overlay else {
        return Ok(study);
    };
    let user = load_overlay(path)?;
    if user.data_path.is_some() {
        study.data_path = user.data_path;
    }
    if user.length_scale.is_some() {
        study.length_scale = user.length_scale;
    }
    study.parcel_sets = merge_named(study.parcel_sets, user.parcel_sets);
    study.experiments = merge_named(study.experiments, user.experiments);
    study.contrasts = merge_named(study.contrasts, user.contrasts);
    validate(&study, &path.display().to_string())?;
    Ok(study)
}

/// Same-named user entries replace built-in ones in place; new names are
/// appended in the order the user gave them.
pub fn merge_named<T: Named>(mut builtin: Vec<T>, user: Vec<T>) -> Vec<T> {
    if user.is_empty() {
        return builtin;
    }
    let mut order: Vec<String> = Vec::new();
    let mut user_map: HashMap<String, T> = HashMap::new();
    for def in user {
        if !user_map.contains_key(def.name()) {
            order.push(def.name().to_string());
        }
        user_map.insert(def.name().to_string(), def);
    }

    let mut merged = Vec::with_capacity(builtin.len() + user_map.len());
    for def in builtin.drain(..) {
        if let Some(user_def) = user_map.remove(def.name()) {
            merged.push(user_def);
        } else {
            merged.push(def);
        }
    }
    for name in order {
        if let Some(def) = user_map.remove(&name) {
            merged.push(def);
        }
    }
    merged
}

fn validate(study: &StudyConfig, source: &str) -> Result<()> {
    let scale = study
        .scale()
        .with_context(|| format!("{}: invalid length_scale", source))?;

    ensure_unique(study.parcel_sets.iter().map(|p| p.name()), source, "parcel set")?;
    ensure_unique(study.experiments.iter().map(|e| e.name()), source, "experiment")?;
    ensure_unique(study.contrasts.iter().map(|c| c.name()), source, "contrast")?;

    for ps in &study.parcel_sets {
        if ps.frois.is_empty() {
            bail!("{}: parcel set '{}' has no fROIs", source, ps.name);
        }
        for froi in &ps.network {
            if ps.froi_rank(froi).is_none() {
                bail!(
                    "{}: parcel set '{}' network member '{}' is not one of its fROIs",
                    source,
                    ps.name,
                    froi
                );
            }
        }
    }

    for contrast in &study.contrasts {
        if let ContrastSpec::Mean { name, terms } | ContrastSpec::Slope { name, terms } = contrast {
            if terms.is_empty() {
                bail!("{}: contrast '{}' has no terms", source, name);
            }
            if terms
                .iter()
                .any(|t| t.lengths.as_ref().is_some_and(|l| l.is_empty()))
            {
                bail!("{}: contrast '{}' selects an empty length list", source, name);
            }
        }
    }

    for exp in &study.experiments {
        if exp.inputs.is_empty() {
            bail!("{}: experiment '{}' has no inputs", source, exp.name);
        }
        if exp.series.is_empty() {
            bail!("{}: experiment '{}' has no series", source, exp.name);
        }
        ensure_unique(exp.series.iter().map(|s| s.name.as_str()), source, "series")?;
        for series in &exp.series {
            if series.lengths.is_empty() {
                bail!(
                    "{}: series '{}' of '{}' has no lengths",
                    source,
                    series.name,
                    exp.name
                );
            }
            if series.lengths.windows(2).any(|w| w[0] >= w[1]) {
                bail!(
                    "{}: lengths of series '{}' in '{}' must be strictly ascending",
                    source,
                    series.name,
                    exp.name
                );
            }
            for &len in &series.lengths {
                if !scale.contains(len) {
                    bail!(
                        "{}: length {} of series '{}' in '{}' is not on the length scale",
                        source,
                        len,
                        series.name,
                        exp.name
                    );
                }
            }
        }
        if let Some(allowed) = &exp.contrasts {
            for name in allowed {
                if !study.contrasts.iter().any(|c| c.name() == name) {
                    bail!(
                        "{}: experiment '{}' lists unknown contrast '{}'",
                        source,
                        exp.name,
                        name
                    );
                }
            }
        }
    }

    Ok(())
}

fn ensure_unique<'a>(names: impl Iterator<Item = &'a str>, source: &str, what: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            bail!("{}: duplicate {} '{}'", source, what, name);
        }
    }
    Ok(())
}
