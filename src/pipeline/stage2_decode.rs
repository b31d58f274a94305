use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::decode::{Condition, decode, is_difference_label};
use crate::matrix::Observation;
use crate::pipeline::Stage;

pub struct Stage2Decode;

impl Stage2Decode {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Default)]
struct Skipped {
    outside_network: usize,
    difference: usize,
    fixation: usize,
    no_series: usize,
    undeclared_length: usize,
}

impl Stage for Stage2Decode {
    fn name(&self) -> &'static str {
        "stage2_decode"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let opts = ctx.experiment.decode_options();
        let mut skipped = Skipped::default();
        let mut observations = Vec::with_capacity(ctx.records.len());

        for record in &ctx.records {
            let froi = ctx.parcel_set.froi_name(record.roi)?;
            if !ctx.parcel_set.in_network(froi) {
                skipped.outside_network += 1;
                continue;
            }
            if is_difference_label(&record.effect) {
                skipped.difference += 1;
                continue;
            }
            let (stimulus, length) = match decode(&record.effect, &opts)? {
                Condition::Fixation => {
                    skipped.fixation += 1;
                    continue;
                }
                Condition::Measured { stimulus, length } => (stimulus, length),
            };
            let Some(series) = ctx
                .experiment
                .series
                .iter()
                .find(|s| s.matches(&record.effect, stimulus))
            else {
                skipped.no_series += 1;
                continue;
            };
            if !series.has_length(length) {
                skipped.undeclared_length += 1;
                continue;
            }
            observations.push(Observation {
                subject: record.subject.clone(),
                froi: froi.to_string(),
                series: series.name.clone(),
                length,
                effect_size: record.effect_size,
            });
        }

        if skipped.undeclared_length > 0 {
            ctx.warnings.push(format!(
                "{} rows had a length not declared for their series",
                skipped.undeclared_length
            ));
        }
        if skipped.no_series > 0 {
            ctx.warnings.push(format!(
                "{} rows matched no series of {}",
                skipped.no_series, ctx.experiment.name
            ));
        }

        info!(
            kept = observations.len(),
            outside_network = skipped.outside_network,
            difference = skipped.difference,
            fixation = skipped.fixation,
            no_series = skipped.no_series,
            undeclared_length = skipped.undeclared_length,
            "conditions_decoded"
        );
        ctx.observations = observations;
        Ok(())
    }
}
