//! Condition label decoding.
//!
//! Effect labels from the imaging export encode the stimulus type and the
//! chunk length (`cond12c`, `jab1c`, `4nc`, `4c_24wl`). Labels are decoded,
//! never rewritten.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusType {
    Critical,
    Jabberwocky,
    NonwordChunk,
}

impl StimulusType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Critical => "C",
            Self::Jabberwocky => "J",
            Self::NonwordChunk => "N",
        }
    }

    pub fn classify(label: &str) -> Self {
        if label.contains("jab") {
            Self::Jabberwocky
        } else if label.contains("nc") {
            Self::NonwordChunk
        } else {
            Self::Critical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPattern {
    /// First maximal run of digits anywhere in the label.
    #[default]
    FirstDigits,
    /// First digit run directly followed by `_`, `c`, `n` or `j`.
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingLengthPolicy {
    #[default]
    Reject,
    /// Legacy behaviour: jabberwocky labels without a length decode to 0.
    ZeroFillJabberwocky,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub pattern: LengthPattern,
    pub missing_length: MissingLengthPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Measured { stimulus: StimulusType, length: u32 },
    Fixation,
}

pub fn is_difference_label(label: &str) -> bool {
    label.contains('-')
}

pub fn decode(label: &str, opts: &DecodeOptions) -> AnalysisResult<Condition> {
    if is_difference_label(label) {
        return Err(AnalysisError::Decoding {
            label: label.to_string(),
            reason: "difference pseudo-condition".to_string(),
        });
    }
    if label.to_ascii_lowercase().starts_with("fix") {
        return Ok(Condition::Fixation);
    }

    let stimulus = StimulusType::classify(label);
    let digits = match opts.pattern {
        LengthPattern::FirstDigits => first_digit_run(label),
        LengthPattern::Terminated => terminated_digit_run(label),
    };

    let length = match digits {
        Some(run) => run.parse::<u32>().map_err(|e| AnalysisError::Decoding {
            label: label.to_string(),
            reason: e.to_string(),
        })?,
        None => match (opts.missing_length, stimulus) {
            (MissingLengthPolicy::ZeroFillJabberwocky, StimulusType::Jabberwocky) => 0,
            _ => {
                return Err(AnalysisError::Decoding {
                    label: label.to_string(),
                    reason: "no chunk length in label".to_string(),
                });
            }
        },
    };

    Ok(Condition::Measured { stimulus, length })
}

fn digit_runs(label: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let bytes = label.as_bytes();
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < bytes.len() && !bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        Some((start, i))
    })
}

fn first_digit_run(label: &str) -> Option<&str> {
    digit_runs(label).next().map(|(s, e)| &label[s..e])
}

fn terminated_digit_run(label: &str) -> Option<&str> {
    let bytes = label.as_bytes();
    digit_runs(label)
        .find(|&(_, end)| matches!(bytes.get(end), Some(b'_' | b'c' | b'n' | b'j')))
        .map(|(s, e)| &label[s..e])
}
