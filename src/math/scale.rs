//! Chunk length to predictor position.
//!
//! Positions are log-compressed so that slopes stay comparable across
//! experiments with different length sets. Lengths outside the table are
//! an error, never extrapolated.

use std::collections::BTreeMap;

use anyhow::{Result, bail};

use crate::error::{AnalysisError, AnalysisResult};

const DEFAULT_TABLE: [(u32, f64); 9] = [
    (1, 0.0),
    (2, 1.0),
    (3, 2.0),
    (4, 3.0),
    (5, 3.5),
    (6, 4.0),
    (8, 4.33),
    (10, 4.66),
    (12, 5.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct LengthScale {
    table: BTreeMap<u32, f64>,
}

impl Default for LengthScale {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.into_iter().collect(),
        }
    }
}

impl LengthScale {
    /// Builds a custom scale; positions must increase with length.
    pub fn from_table(table: BTreeMap<u32, f64>) -> Result<Self> {
        if table.is_empty() {
            bail!("length scale is empty");
        }
        let mut prev: Option<(u32, f64)> = None;
        for (&len, &pos) in &table {
            if !pos.is_finite() {
                bail!("length scale position for {} is not finite", len);
            }
            if let Some((prev_len, prev_pos)) = prev {
                if pos <= prev_pos {
                    bail!(
                        "length scale must be strictly increasing: {} -> {} but {} -> {}",
                        prev_len,
                        prev_pos,
                        len,
                        pos
                    );
                }
            }
            prev = Some((len, pos));
        }
        Ok(Self { table })
    }

    pub fn position(&self, length: u32) -> AnalysisResult<f64> {
        self.table
            .get(&length)
            .copied()
            .ok_or(AnalysisError::UnmappedLength(length))
    }

    pub fn positions(&self, lengths: &[u32]) -> AnalysisResult<Vec<f64>> {
        lengths.iter().map(|&l| self.position(l)).collect()
    }

    pub fn lengths(&self) -> impl Iterator<Item = u32> + '_ {
        self.table.keys().copied()
    }

    pub fn contains(&self, length: u32) -> bool {
        self.table.contains_key(&length)
    }
}
