use nlength::config::{ExperimentSpec, SeriesSpec};
use nlength::decode::{LengthPattern, MissingLengthPolicy, StimulusType};
use nlength::error::AnalysisError;
use nlength::matrix::{Observation, build_froi_matrices, build_matrix};

fn series(name: &str, stimulus: StimulusType, lengths: &[u32]) -> SeriesSpec {
    SeriesSpec {
        name: name.to_string(),
        stimulus,
        label_suffix: None,
        column_prefix: None,
        column_suffix: String::new(),
        lengths: lengths.to_vec(),
    }
}

fn obs(subject: &str, series: &str, length: u32, value: f64) -> Observation {
    Observation {
        subject: subject.to_string(),
        froi: "LIFG".to_string(),
        series: series.to_string(),
        length,
        effect_size: value,
    }
}

#[test]
fn builds_sorted_matrix_and_is_deterministic() {
    let spec = series("C", StimulusType::Critical, &[1, 2, 4]);
    let rows = vec![
        obs("s2", "C", 4, 2.4),
        obs("s1", "C", 1, 1.1),
        obs("s2", "C", 1, 2.1),
        obs("s1", "C", 4, 1.4),
        obs("s1", "C", 2, 1.2),
        obs("s2", "C", 2, 2.2),
    ];
    let m = build_matrix(&rows, &spec, "LIFG").unwrap();
    assert_eq!(m.subjects, vec!["s1", "s2"]);
    assert_eq!(m.lengths, vec![1, 2, 4]);
    assert_eq!(m.row(0), vec![1.1, 1.2, 1.4]);
    assert_eq!(m.column(4).unwrap(), &[1.4, 2.4]);
    assert!(m.column(3).is_none());

    let mut reversed = rows.clone();
    reversed.reverse();
    assert_eq!(build_matrix(&reversed, &spec, "LIFG").unwrap(), m);
}

#[test]
fn empty_length_is_skipped() {
    let spec = series("C", StimulusType::Critical, &[1, 2, 3, 4]);
    let rows = vec![
        obs("s1", "C", 1, 1.0),
        obs("s1", "C", 2, 2.0),
        obs("s1", "C", 4, 4.0),
    ];
    let m = build_matrix(&rows, &spec, "LIFG").unwrap();
    assert_eq!(m.lengths, vec![1, 2, 4]);
}

#[test]
fn divergent_subjects_fail_alignment() {
    let spec = series("C", StimulusType::Critical, &[1, 2]);
    let rows = vec![
        obs("s1", "C", 1, 1.0),
        obs("s2", "C", 1, 1.0),
        obs("s1", "C", 2, 2.0),
    ];
    let err = build_matrix(&rows, &spec, "LIFG").unwrap_err();
    assert!(matches!(err, AnalysisError::Alignment { .. }));
}

#[test]
fn duplicate_rows_fail() {
    let spec = series("C", StimulusType::Critical, &[1]);
    let rows = vec![obs("s1", "C", 1, 1.0), obs("s1", "C", 1, 1.5)];
    let err = build_matrix(&rows, &spec, "LIFG").unwrap_err();
    assert!(matches!(err, AnalysisError::DuplicateRecord { length: 1, .. }));
}

#[test]
fn no_rows_is_empty_series() {
    let spec = series("C", StimulusType::Critical, &[1, 2]);
    let rows = vec![obs("s1", "C", 1, 1.0)];
    let err = build_matrix(&rows, &spec, "LPostTemp").unwrap_err();
    assert!(matches!(err, AnalysisError::EmptySeries { .. }));
}

#[test]
fn series_must_share_subjects() {
    let exp = ExperimentSpec {
        name: "nlength2".to_string(),
        inputs: vec!["x.csv".to_string()],
        exclude_subjects: Vec::new(),
        length_pattern: LengthPattern::FirstDigits,
        missing_length: MissingLengthPolicy::Reject,
        series: vec![
            series("C", StimulusType::Critical, &[1, 4]),
            series("J", StimulusType::Jabberwocky, &[1, 4]),
        ],
        contrasts: None,
    };
    let mut rows = vec![
        obs("s1", "C", 1, 1.0),
        obs("s1", "C", 4, 1.0),
        obs("s2", "C", 1, 1.0),
        obs("s2", "C", 4, 1.0),
        obs("s1", "J", 1, 1.0),
        obs("s1", "J", 4, 1.0),
    ];
    let err = build_froi_matrices(&rows, &exp, "LIFG").unwrap_err();
    assert!(matches!(err, AnalysisError::Alignment { .. }));

    rows.push(obs("s2", "J", 1, 0.5));
    rows.push(obs("s2", "J", 4, 0.5));
    let m = build_froi_matrices(&rows, &exp, "LIFG").unwrap();
    assert_eq!(m.subjects, vec!["s1", "s2"]);
    assert_eq!(m.matrix("J").unwrap().column(1).unwrap(), &[1.0, 0.5]);
}
