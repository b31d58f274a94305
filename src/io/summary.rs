use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub parcel_set: String,
    pub experiment: String,
    pub status: UnitStatus,
    pub error: Option<String>,
    pub contrast_file: Option<String>,
    pub profile_file: Option<String>,
    pub n_subjects: usize,
    pub n_frois: usize,
    pub contrasts: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: ToolMeta,
    pub units: Vec<UnitReport>,
}

impl RunSummary {
    pub fn new(units: Vec<UnitReport>) -> Self {
        Self {
            tool: ToolMeta {
                name: "nlength".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            units,
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| u.status == UnitStatus::Failed)
    }
}

pub fn write_run_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("nlength v{}\n", summary.tool.version));
    for u in &summary.units {
        match u.status {
            UnitStatus::Ok => out.push_str(&format!(
                "{}_{}: ok ({} subjects, {} fROIs, {} contrasts)\n",
                u.parcel_set,
                u.experiment,
                u.n_subjects,
                u.n_frois,
                u.contrasts.len()
            )),
            UnitStatus::Failed => out.push_str(&format!(
                "{}_{}: FAILED: {}\n",
                u.parcel_set,
                u.experiment,
                u.error.as_deref().unwrap_or("unknown error")
            )),
        }
    }
    let warned: Vec<&UnitReport> = summary.units.iter().filter(|u| !u.warnings.is_empty()).collect();
    if !warned.is_empty() {
        out.push_str("warnings:\n");
        for u in warned {
            for w in &u.warnings {
                out.push_str(&format!("- {}_{}: {}\n", u.parcel_set, u.experiment, w));
            }
        }
    }
    out
}
