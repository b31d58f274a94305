use std::path::PathBuf;

use anyhow::Result;

use crate::config::{ContrastSpec, ExperimentSpec, Named, ParcelSet, StudyConfig};
use crate::contrasts::FroiContrasts;
use crate::io::effect_table::EffectRecord;
use crate::math::scale::LengthScale;
use crate::matrix::{FroiMatrices, Observation};
use crate::signif::contrast_file_name;

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub contrasts_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub contrasts_path: PathBuf,
    pub profile_path: PathBuf,
}

/// State of one parcel-set x experiment unit as it moves through the
/// pipeline stages.
#[derive(Debug)]
pub struct Ctx {
    pub parcel_set: ParcelSet,
    pub experiment: ExperimentSpec,
    /// Battery entries that apply to this experiment, in battery order.
    pub battery: Vec<ContrastSpec>,
    pub scale: LengthScale,
    pub data_path: PathBuf,
    pub input_paths: Vec<PathBuf>,
    pub records: Vec<EffectRecord>,
    pub observations: Vec<Observation>,
    pub matrices: Vec<FroiMatrices>,
    pub results: Vec<FroiContrasts>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
}

impl Ctx {
    pub fn new(
        study: &StudyConfig,
        parcel_set: &ParcelSet,
        experiment: &ExperimentSpec,
        data_path: PathBuf,
        out_dir: PathBuf,
    ) -> Result<Self> {
        let battery = experiment
            .applicable_contrasts(&study.contrasts)
            .into_iter()
            .cloned()
            .collect();
        let contrasts_dir = out_dir.join("contrasts");
        let profiles_dir = out_dir.join("profiles");
        let unit = format!("{}_{}", parcel_set.name, experiment.name);
        Ok(Self {
            input_paths: experiment.input_paths(&data_path, parcel_set),
            parcel_set: parcel_set.clone(),
            experiment: experiment.clone(),
            battery,
            scale: study.scale()?,
            data_path,
            records: Vec::new(),
            observations: Vec::new(),
            matrices: Vec::new(),
            results: Vec::new(),
            warnings: Vec::new(),
            output: OutputPaths {
                contrasts_path: contrasts_dir
                    .join(contrast_file_name(&parcel_set.name, &experiment.name)),
                profile_path: profiles_dir.join(format!("{}_profile.csv", unit)),
                out_dir,
                contrasts_dir,
                profiles_dir,
            },
        })
    }

    pub fn unit_name(&self) -> String {
        format!("{}_{}", self.parcel_set.name, self.experiment.name)
    }

    pub fn battery_names(&self) -> Vec<String> {
        self.battery.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn n_subjects(&self) -> usize {
        self.results.first().map(|r| r.subjects.len()).unwrap_or(0)
    }
}
