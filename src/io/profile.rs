use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::contrasts::series_fit;
use crate::io::csv_field;
use crate::math::scale::LengthScale;
use crate::math::stats::{mean, sem};
use crate::matrix::FroiMatrices;

/// Per-length group means with SEM and the mean fitted line, one row per
/// (fROI, series, length).
pub fn write_profile(path: &Path, matrices: &[FroiMatrices], scale: &LengthScale) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "fROI,series,length,position,n,mean,sem,fitted")?;
    for froi in matrices {
        for matrix in &froi.series {
            // A single-length series has no line to draw.
            let fit = series_fit(matrix, scale).ok();
            for (j, &length) in matrix.lengths.iter().enumerate() {
                let position = scale.position(length)?;
                let col = &matrix.columns[j];
                let fitted = fit
                    .as_ref()
                    .map(|f| f.mean_fitted(position).to_string())
                    .unwrap_or_default();
                writeln!(
                    w,
                    "{},{},{},{},{},{},{},{}",
                    csv_field(&froi.froi),
                    csv_field(&matrix.series),
                    length,
                    position,
                    col.len(),
                    mean(col),
                    sem(col),
                    fitted
                )?;
            }
        }
    }
    w.flush()?;
    Ok(())
}
