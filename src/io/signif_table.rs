use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::io::{csv_field, read_text, split_fields};
use crate::signif::SignifRow;
use crate::signif::effect_test::EffectTestRow;

const SIGNIF_HEADER: &str = "parcel_set,experiment,contrast,fROI,conv,sing,beta,se,t,p,p_fdr,signif";
const IMPORT_COLUMNS: [&str; 10] = [
    "parcel_set",
    "experiment",
    "contrast",
    "fROI",
    "conv",
    "sing",
    "beta",
    "se",
    "t",
    "p",
];

pub fn write_signif(path: &Path, rows: &[SignifRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "{}", SIGNIF_HEADER)?;
    for r in rows {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            csv_field(&r.parcel_set),
            csv_field(&r.experiment),
            csv_field(&r.contrast),
            csv_field(&r.froi),
            r.conv,
            r.sing,
            r.beta,
            r.se,
            r.t,
            r.p,
            r.p_fdr,
            r.signif
        )?;
    }
    w.flush()?;
    Ok(())
}

/// Rows computed elsewhere (e.g. mixed-model fits). `---` marks an
/// estimate the fitting log did not report; a row without a p-value is
/// skipped with a warning since it cannot enter a correction family.
pub fn read_signif_import(path: &Path) -> Result<Vec<SignifRow>> {
    let content = read_text(path)?;
    let source = path.display().to_string();
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        bail!("{}: import table is empty", source);
    };
    let header = split_fields(header, ',');
    let mut idx = [0usize; 10];
    for (slot, name) in idx.iter_mut().zip(IMPORT_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("{}: missing column '{}'", source, name))?;
    }

    let mut rows = Vec::new();
    for (line_idx, line) in lines {
        let line_no = line_idx + 1;
        let f = split_fields(line, ',');
        if f.len() != header.len() {
            bail!("{}:{} malformed row", source, line_no);
        }
        let num = |i: usize| -> Result<f64> {
            let v = f[idx[i]].as_str();
            if v == "---" {
                return Ok(f64::NAN);
            }
            v.trim_end_matches('*')
                .parse::<f64>()
                .with_context(|| format!("{}:{} invalid {} '{}'", source, line_no, IMPORT_COLUMNS[i], v))
        };
        let p = num(9)?;
        if p.is_nan() {
            warn!(
                source = %source,
                line = line_no,
                contrast = %f[idx[2]],
                froi = %f[idx[3]],
                "imported row has no p-value, skipped"
            );
            continue;
        }
        if !(0.0..=1.0).contains(&p) {
            bail!("{}:{} p must be within [0, 1]", source, line_no);
        }
        rows.push(SignifRow {
            parcel_set: f[idx[0]].clone(),
            experiment: f[idx[1]].clone(),
            contrast: f[idx[2]].clone(),
            froi: f[idx[3]].clone(),
            conv: f[idx[4]].clone(),
            sing: f[idx[5]].clone(),
            beta: num(6)?,
            se: num(7)?,
            t: num(8)?,
            p,
            p_fdr: f64::NAN,
            signif: String::new(),
        });
    }
    Ok(rows)
}

pub fn write_effect_test(path: &Path, rows: &[EffectTestRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "parcel_set,experiment,fROI,n,t,p,d,p_fdr")?;
    for r in rows {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{}",
            csv_field(&r.parcel_set),
            csv_field(&r.experiment),
            csv_field(&r.froi),
            r.n,
            r.t,
            r.p,
            r.d,
            r.p_fdr
        )?;
    }
    w.flush()?;
    Ok(())
}
