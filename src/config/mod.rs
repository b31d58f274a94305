mod loader;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::decode::{DecodeOptions, LengthPattern, MissingLengthPolicy, StimulusType};
use crate::error::{AnalysisError, AnalysisResult};
use crate::math::scale::LengthScale;

pub use loader::{StudyOverlay, load_builtin, load_overlay, load_study, merge_named};

pub const PARCEL_DIR_PLACEHOLDER: &str = "{parcel_dir}";

pub trait Named {
    fn name(&self) -> &str;
}

/// A parcellation scheme: which fROIs exist, in which order ROI indices
/// refer to them, and which of them form the analysed network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelSet {
    pub name: String,
    pub data_dir: String,
    pub frois: Vec<String>,
    pub network: Vec<String>,
}

impl ParcelSet {
    /// Resolves a 1-based ROI index from the imaging export.
    pub fn froi_name(&self, roi: usize) -> AnalysisResult<&str> {
        if roi == 0 || roi > self.frois.len() {
            return Err(AnalysisError::UnknownRoi {
                index: roi,
                parcel_set: self.name.clone(),
                n: self.frois.len(),
            });
        }
        Ok(&self.frois[roi - 1])
    }

    pub fn in_network(&self, froi: &str) -> bool {
        self.network.iter().any(|f| f == froi)
    }

    pub fn froi_rank(&self, froi: &str) -> Option<usize> {
        self.frois.iter().position(|f| f == froi)
    }
}

impl Named for ParcelSet {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One stimulus stream of an experiment and its legal lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    pub stimulus: StimulusType,
    #[serde(default)]
    pub label_suffix: Option<String>,
    #[serde(default)]
    pub column_prefix: Option<String>,
    #[serde(default)]
    pub column_suffix: String,
    pub lengths: Vec<u32>,
}

impl SeriesSpec {
    pub fn matches(&self, label: &str, stimulus: StimulusType) -> bool {
        if stimulus != self.stimulus {
            return false;
        }
        match &self.label_suffix {
            Some(suffix) => label.ends_with(suffix.as_str()),
            None => true,
        }
    }

    pub fn column_name(&self, length: u32) -> String {
        let prefix = self
            .column_prefix
            .as_deref()
            .unwrap_or(self.stimulus.code());
        format!("{}{:02}{}", prefix, length, self.column_suffix)
    }

    pub fn has_length(&self, length: u32) -> bool {
        self.lengths.contains(&length)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTerm {
    pub series: String,
    /// `None` selects every column the series has.
    #[serde(default)]
    pub lengths: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContrastSpec {
    Mean {
        name: String,
        terms: Vec<SeriesTerm>,
    },
    Slope {
        name: String,
        terms: Vec<SeriesTerm>,
    },
    Difference {
        name: String,
        minuend: String,
        subtrahend: String,
    },
}

impl Named for ContrastSpec {
    fn name(&self) -> &str {
        match self {
            Self::Mean { name, .. } | Self::Slope { name, .. } | Self::Difference { name, .. } => {
                name
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSpec {
    pub name: String,
    pub inputs: Vec<String>,
    #[serde(default)]
    pub exclude_subjects: Vec<String>,
    #[serde(default)]
    pub length_pattern: LengthPattern,
    #[serde(default)]
    pub missing_length: MissingLengthPolicy,
    pub series: Vec<SeriesSpec>,
    /// Restricts the battery; `None` keeps every applicable contrast.
    #[serde(default)]
    pub contrasts: Option<Vec<String>>,
}

impl Named for ExperimentSpec {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ExperimentSpec {
    pub fn series(&self, name: &str) -> Option<&SeriesSpec> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            pattern: self.length_pattern,
            missing_length: self.missing_length,
        }
    }

    pub fn input_paths(&self, data_path: &Path, parcel_set: &ParcelSet) -> Vec<PathBuf> {
        self.inputs
            .iter()
            .map(|t| data_path.join(t.replace(PARCEL_DIR_PLACEHOLDER, &parcel_set.data_dir)))
            .collect()
    }

    pub fn raw_columns(&self) -> Vec<String> {
        self.series
            .iter()
            .flat_map(|s| s.lengths.iter().map(|&l| s.column_name(l)))
            .collect()
    }

    /// Battery entries this experiment can evaluate, in battery order.
    /// Differences only see raw columns and contrasts accepted before them.
    pub fn applicable_contrasts<'a>(&self, battery: &'a [ContrastSpec]) -> Vec<&'a ContrastSpec> {
        let mut available: HashSet<String> = self.raw_columns().into_iter().collect();
        let mut out = Vec::new();
        for spec in battery {
            if let Some(allowed) = &self.contrasts {
                if !allowed.iter().any(|a| a == spec.name()) {
                    continue;
                }
            }
            let ok = match spec {
                ContrastSpec::Mean { terms, .. } | ContrastSpec::Slope { terms, .. } => {
                    !terms.is_empty() && terms.iter().all(|t| self.term_is_declared(t))
                }
                ContrastSpec::Difference {
                    minuend,
                    subtrahend,
                    ..
                } => available.contains(minuend) && available.contains(subtrahend),
            };
            if ok {
                available.insert(spec.name().to_string());
                out.push(spec);
            }
        }
        out
    }

    fn term_is_declared(&self, term: &SeriesTerm) -> bool {
        match self.series(&term.series) {
            Some(series) => match &term.lengths {
                Some(lengths) => lengths.iter().all(|&l| series.has_length(l)),
                None => true,
            },
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    #[serde(default)]
    pub length_scale: Option<BTreeMap<u32, f64>>,
    pub parcel_sets: Vec<ParcelSet>,
    pub experiments: Vec<ExperimentSpec>,
    pub contrasts: Vec<ContrastSpec>,
}

impl StudyConfig {
    pub fn scale(&self) -> Result<LengthScale> {
        match &self.length_scale {
            Some(table) => LengthScale::from_table(table.clone()),
            None => Ok(LengthScale::default()),
        }
    }

    pub fn parcel_set(&self, name: &str) -> Option<&ParcelSet> {
        self.parcel_sets.iter().find(|p| p.name == name)
    }

    pub fn experiment(&self, name: &str) -> Option<&ExperimentSpec> {
        self.experiments.iter().find(|e| e.name == name)
    }

    pub fn parcel_set_rank(&self, name: &str) -> usize {
        self.parcel_sets
            .iter()
            .position(|p| p.name == name)
            .unwrap_or(usize::MAX)
    }

    pub fn experiment_rank(&self, name: &str) -> usize {
        self.experiments
            .iter()
            .position(|e| e.name == name)
            .unwrap_or(usize::MAX)
    }
}
