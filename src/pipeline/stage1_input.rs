use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::effect_table::read_effect_table;
use crate::pipeline::Stage;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let mut records = Vec::new();
        for path in &ctx.input_paths {
            let table = read_effect_table(path)?;
            info!(input = %path.display(), rows = table.len(), "effect_table_loaded");
            records.extend(table);
        }

        let before = records.len();
        let excluded = &ctx.experiment.exclude_subjects;
        records.retain(|r| !excluded.iter().any(|s| s == &r.subject));
        let dropped = before - records.len();
        if dropped > 0 {
            info!(rows = dropped, "excluded_subject_rows_dropped");
        }

        ctx.records = records;
        Ok(())
    }
}
