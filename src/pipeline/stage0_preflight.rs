use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::error::AnalysisError;
use crate::pipeline::Stage;

/// Checks every input of the unit before anything is read or written.
pub struct Stage0Preflight;

impl Stage0Preflight {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Preflight {
    fn name(&self) -> &'static str {
        "stage0_preflight"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for path in &ctx.input_paths {
            if !path.is_file() {
                return Err(AnalysisError::InputMissing {
                    path: path.clone(),
                    what: format!("effect-size table for {}", ctx.unit_name()),
                }
                .into());
            }
        }
        if ctx.battery.is_empty() {
            ctx.warnings
                .push("no battery contrast applies to this experiment".to_string());
        }
        info!(inputs = ctx.input_paths.len(), "inputs_present");
        Ok(())
    }
}
