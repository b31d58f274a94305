use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::matrix::build_froi_matrices;
use crate::pipeline::Stage;

pub struct Stage3Matrix;

impl Stage3Matrix {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Matrix {
    fn name(&self) -> &'static str {
        "stage3_matrix"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let mut matrices = Vec::with_capacity(ctx.parcel_set.network.len());
        for froi in &ctx.parcel_set.network {
            let m = build_froi_matrices(&ctx.observations, &ctx.experiment, froi)?;
            for series in &m.series {
                let declared = ctx
                    .experiment
                    .series(&series.series)
                    .map(|s| s.lengths.len())
                    .unwrap_or(0);
                if series.lengths.len() < declared {
                    ctx.warnings.push(format!(
                        "{} in {}: {} of {} lengths present",
                        series.series,
                        froi,
                        series.lengths.len(),
                        declared
                    ));
                }
            }
            info!(froi = %froi, subjects = m.subjects.len(), "matrices_ready");
            matrices.push(m);
        }
        ctx.matrices = matrices;
        Ok(())
    }
}
