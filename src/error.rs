use std::path::PathBuf;

use thiserror::Error;

/// Failures of the contrast engine. Each one aborts the current
/// parcel-set x experiment unit and nothing else.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input missing: {path} ({what})")]
    InputMissing { path: PathBuf, what: String },

    #[error("cannot decode condition label '{label}': {reason}")]
    Decoding { label: String, reason: String },

    #[error("subject alignment failed for {series} in {froi}: {detail}")]
    Alignment {
        series: String,
        froi: String,
        detail: String,
    },

    #[error("slope fit for {series} in {froi} needs at least 2 distinct lengths, got {got}")]
    UnderdeterminedFit {
        series: String,
        froi: String,
        got: usize,
    },

    #[error("length {0} has no position on the length scale")]
    UnmappedLength(u32),

    #[error("duplicate record for subject '{subject}', {series} length {length} in {froi}")]
    DuplicateRecord {
        subject: String,
        series: String,
        length: u32,
        froi: String,
    },

    #[error("ROI index {index} is outside parcel set '{parcel_set}' ({n} fROIs)")]
    UnknownRoi {
        index: usize,
        parcel_set: String,
        n: usize,
    },

    #[error("no rows for series {series} in {froi}")]
    EmptySeries { series: String, froi: String },

    #[error("contrast '{contrast}' references missing column {column} in {froi}")]
    MissingColumn {
        contrast: String,
        column: String,
        froi: String,
    },
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
