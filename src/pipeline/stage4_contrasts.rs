use anyhow::Result;
use tracing::info;

use crate::contrasts::compute_froi;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage4Contrasts;

impl Stage4Contrasts {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Contrasts {
    fn name(&self) -> &'static str {
        "stage4_contrasts"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let battery: Vec<_> = ctx.battery.iter().collect();
        let mut results = Vec::with_capacity(ctx.matrices.len());
        for froi in &ctx.matrices {
            results.push(compute_froi(froi, &ctx.experiment, &battery, &ctx.scale)?);
        }
        info!(
            frois = results.len(),
            contrasts = battery.len(),
            "contrasts_ready"
        );
        ctx.results = results;
        Ok(())
    }
}
