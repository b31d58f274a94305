use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

pub mod contrast_table;
pub mod effect_table;
pub mod profile;
pub mod signif_table;
pub mod summary;

pub(crate) fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let decoder = GzDecoder::new(file);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub(crate) fn read_text(path: &Path) -> Result<String> {
    let mut reader = open_maybe_gz(path)?;
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content)
}

/// Splits one delimited line. Double-quoted fields may contain the
/// delimiter; `""` inside quotes is a literal quote. Fields are trimmed.
pub(crate) fn split_fields(line: &str, delim: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => {
                fields.push(cur.trim().to_string());
                cur.clear();
            }
            c => cur.push(c),
        }
    }
    fields.push(cur.trim().to_string());
    fields
}

pub(crate) fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub(crate) fn delimiter_for(path: &Path) -> char {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .trim_end_matches(".gz");
    if name.ends_with(".tsv") { '\t' } else { ',' }
}
