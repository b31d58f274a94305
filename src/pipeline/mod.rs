use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_preflight;
pub mod stage1_input;
pub mod stage2_decode;
pub mod stage3_matrix;
pub mod stage4_contrasts;
pub mod stage5_output;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Every stage from input to written contrast tables.
    pub fn contrasts() -> Self {
        Self::new(vec![
            Box::new(stage0_preflight::Stage0Preflight::new()),
            Box::new(stage1_input::Stage1Input::new()),
            Box::new(stage2_decode::Stage2Decode::new()),
            Box::new(stage3_matrix::Stage3Matrix::new()),
            Box::new(stage4_contrasts::Stage4Contrasts::new()),
            Box::new(stage5_output::Stage5Output::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let unit = ctx.unit_name();
        for stage in &self.stages {
            let start = Instant::now();
            info!(unit = %unit, stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    unit = %unit,
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                unit = %unit,
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
