use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::contrast_table::write_contrast_table;
use crate::io::profile::write_profile;
use crate::pipeline::Stage;

pub struct Stage5Output;

impl Stage5Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Output {
    fn name(&self) -> &'static str {
        "stage5_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        fs::create_dir_all(&ctx.output.contrasts_dir)
            .with_context(|| format!("failed to create {}", ctx.output.contrasts_dir.display()))?;
        fs::create_dir_all(&ctx.output.profiles_dir)
            .with_context(|| format!("failed to create {}", ctx.output.profiles_dir.display()))?;
        write_contrast_table(&ctx.output.contrasts_path, &ctx.results)?;
        write_profile(&ctx.output.profile_path, &ctx.matrices, &ctx.scale)?;
        info!(
            contrasts = %ctx.output.contrasts_path.display(),
            profile = %ctx.output.profile_path.display(),
            "outputs_written"
        );
        Ok(())
    }
}
