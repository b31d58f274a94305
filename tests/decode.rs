use nlength::decode::{
    Condition, DecodeOptions, LengthPattern, MissingLengthPolicy, StimulusType, decode,
    is_difference_label,
};
use nlength::error::AnalysisError;

fn measured(label: &str, opts: &DecodeOptions) -> (StimulusType, u32) {
    match decode(label, opts).unwrap() {
        Condition::Measured { stimulus, length } => (stimulus, length),
        Condition::Fixation => panic!("{} decoded as fixation", label),
    }
}

#[test]
fn decode_known_labels() {
    let opts = DecodeOptions::default();
    assert_eq!(measured("cond12c", &opts), (StimulusType::Critical, 12));
    assert_eq!(measured("jab1c", &opts), (StimulusType::Jabberwocky, 1));
    assert_eq!(measured("4nc", &opts), (StimulusType::NonwordChunk, 4));
    assert_eq!(measured("cond01c", &opts), (StimulusType::Critical, 1));
}

#[test]
fn jab_wins_over_nc() {
    let opts = DecodeOptions::default();
    assert_eq!(measured("jab4nc", &opts), (StimulusType::Jabberwocky, 4));
}

#[test]
fn fixation_is_not_measured() {
    let opts = DecodeOptions::default();
    assert_eq!(decode("fix", &opts).unwrap(), Condition::Fixation);
    assert_eq!(decode("Fixation", &opts).unwrap(), Condition::Fixation);
}

#[test]
fn difference_labels_are_rejected() {
    assert!(is_difference_label("cond12c-cond1c"));
    assert!(!is_difference_label("cond12c"));
    let err = decode("cond12c-cond1c", &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Decoding { .. }));
}

#[test]
fn missing_length_rejected_by_default() {
    let err = decode("jabc", &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Decoding { .. }));
    let err = decode("condc", &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Decoding { .. }));
}

#[test]
fn zero_fill_only_applies_to_jabberwocky() {
    let opts = DecodeOptions {
        pattern: LengthPattern::FirstDigits,
        missing_length: MissingLengthPolicy::ZeroFillJabberwocky,
    };
    assert_eq!(measured("jabc", &opts), (StimulusType::Jabberwocky, 0));
    assert!(decode("condc", &opts).is_err());
}

#[test]
fn terminated_pattern_skips_unterminated_runs() {
    let opts = DecodeOptions {
        pattern: LengthPattern::Terminated,
        missing_length: MissingLengthPolicy::Reject,
    };
    assert_eq!(measured("4c_24wl", &opts), (StimulusType::Critical, 4));
    assert_eq!(measured("run1x_4c_24wl", &opts), (StimulusType::Critical, 4));
    assert_eq!(measured("10c_30wl", &opts), (StimulusType::Critical, 10));

    let first = DecodeOptions::default();
    assert_eq!(measured("run1x_4c_24wl", &first), (StimulusType::Critical, 1));
}
