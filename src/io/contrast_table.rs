use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::contrasts::FroiContrasts;
use crate::io::{csv_field, read_text, split_fields};

const IO_BUF_CAPACITY: usize = 1 << 16;

/// A contrast CSV read back: `Subject,fROI` then numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastTable {
    pub columns: Vec<String>,
    pub rows: Vec<ContrastRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContrastRow {
    pub subject: String,
    pub froi: String,
    pub values: Vec<f64>,
}

impl ContrastTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// fROIs in first-appearance order.
    pub fn frois(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.froi.as_str()) {
                out.push(&row.froi);
            }
        }
        out
    }

    /// `(subject, value)` pairs of one column within one fROI.
    pub fn values(&self, froi: &str, column: usize) -> Vec<(&str, f64)> {
        self.rows
            .iter()
            .filter(|r| r.froi == froi)
            .map(|r| (r.subject.as_str(), r.values[column]))
            .collect()
    }
}

pub fn write_contrast_table(path: &Path, blocks: &[FroiContrasts]) -> Result<()> {
    let Some(first) = blocks.first() else {
        bail!("no fROI results to write to {}", path.display());
    };
    let columns = first.column_names();
    for block in blocks.iter().skip(1) {
        if block.column_names() != columns {
            bail!(
                "fROI {} has columns that differ from fROI {}",
                block.froi,
                first.froi
            );
        }
    }

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::with_capacity(IO_BUF_CAPACITY, file);

    write!(w, "Subject,fROI")?;
    for c in &columns {
        write!(w, ",{}", csv_field(c))?;
    }
    writeln!(w)?;

    for block in blocks {
        let cols: Vec<&[f64]> = columns
            .iter()
            .map(|c| block.get(c).unwrap_or_default())
            .collect();
        for (i, subject) in block.subjects.iter().enumerate() {
            write!(w, "{},{}", csv_field(subject), csv_field(&block.froi))?;
            for col in &cols {
                write!(w, ",{}", col[i])?;
            }
            writeln!(w)?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn read_contrast_table(path: &Path) -> Result<ContrastTable> {
    let content = read_text(path)?;
    let source = path.display().to_string();
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        bail!("{}: contrast table is empty", source);
    };
    let header = split_fields(header, ',');
    if header.len() < 2 || header[0] != "Subject" || header[1] != "fROI" {
        bail!("{}: header must start with Subject,fROI", source);
    }
    let columns: Vec<String> = header[2..].to_vec();

    let mut rows = Vec::new();
    for (line_idx, line) in lines {
        let line_no = line_idx + 1;
        let fields = split_fields(line, ',');
        if fields.len() != header.len() {
            bail!(
                "{}:{} malformed row (expected {} fields, got {})",
                source,
                line_no,
                header.len(),
                fields.len()
            );
        }
        let values = fields[2..]
            .iter()
            .map(|v| {
                v.parse::<f64>()
                    .with_context(|| format!("{}:{} invalid number '{}'", source, line_no, v))
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(ContrastRow {
            subject: fields[0].clone(),
            froi: fields[1].clone(),
            values,
        });
    }
    Ok(ContrastTable { columns, rows })
}
