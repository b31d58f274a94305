use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::io::{delimiter_for, read_text, split_fields};

/// One row of a per-subject effect-size export.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectRecord {
    pub subject: String,
    /// 1-based index into the parcel set's fROI list.
    pub roi: usize,
    pub effect: String,
    pub effect_size: f64,
}

const REQUIRED: [&str; 4] = ["Subject", "ROI", "Effect", "EffectSize"];

pub fn read_effect_table(path: &Path) -> Result<Vec<EffectRecord>> {
    let content = read_text(path)?;
    parse_effect_table(&content, &path.display().to_string(), delimiter_for(path))
}

pub fn parse_effect_table(content: &str, source: &str, delim: char) -> Result<Vec<EffectRecord>> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        bail!("{}: effect table is empty", source);
    };
    let header = split_fields(header.trim_start_matches('\u{feff}'), delim);
    let mut idx = [0usize; 4];
    for (slot, name) in idx.iter_mut().zip(REQUIRED) {
        *slot = header
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("{}: missing column '{}'", source, name))?;
    }
    let [i_subject, i_roi, i_effect, i_size] = idx;
    let width = header.len();

    let mut out = Vec::new();
    for (line_idx, line) in lines {
        let line_no = line_idx + 1;
        let fields = split_fields(line, delim);
        if fields.len() != width {
            bail!(
                "{}:{} malformed row (expected {} fields, got {})",
                source,
                line_no,
                width,
                fields.len()
            );
        }
        let roi: usize = fields[i_roi]
            .parse()
            .with_context(|| format!("{}:{} invalid ROI '{}'", source, line_no, fields[i_roi]))?;
        let effect_size: f64 = fields[i_size].parse().with_context(|| {
            format!(
                "{}:{} invalid EffectSize '{}'",
                source, line_no, fields[i_size]
            )
        })?;
        if !effect_size.is_finite() {
            bail!("{}:{} non-finite EffectSize", source, line_no);
        }
        if fields[i_subject].is_empty() {
            bail!("{}:{} empty Subject", source, line_no);
        }
        out.push(EffectRecord {
            subject: fields[i_subject].clone(),
            roi,
            effect: fields[i_effect].clone(),
            effect_size,
        });
    }
    Ok(out)
}
