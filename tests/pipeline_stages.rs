use nlength::config::load_builtin;
use nlength::ctx::Ctx;
use nlength::decode::MissingLengthPolicy;
use nlength::io::effect_table::EffectRecord;
use nlength::pipeline::Stage;
use nlength::pipeline::stage2_decode::Stage2Decode;
use tempfile::TempDir;

fn record(subject: &str, roi: usize, effect: &str, value: f64) -> EffectRecord {
    EffectRecord {
        subject: subject.to_string(),
        roi,
        effect: effect.to_string(),
        effect_size: value,
    }
}

fn ctx(experiment: &str, missing: MissingLengthPolicy, out: &TempDir) -> Ctx {
    let mut study = load_builtin().unwrap();
    for exp in study.experiments.iter_mut() {
        exp.missing_length = missing;
    }
    let ps = study.parcel_set("evlab").unwrap();
    let exp = study.experiment(experiment).unwrap();
    Ctx::new(&study, ps, exp, out.path().to_path_buf(), out.path().to_path_buf()).unwrap()
}

#[test]
fn decode_stage_filters_and_routes_rows() {
    let out = TempDir::new().unwrap();
    let mut ctx = ctx("nlength2", MissingLengthPolicy::Reject, &out);
    ctx.records = vec![
        record("s1", 2, "cond12c", 1.0),
        record("s1", 2, "jab4c", 0.5),
        record("s1", 2, "3nc", 0.2),
        record("s1", 8, "cond12c", 9.0),
        record("s1", 2, "cond12c-jab1c", 0.5),
        record("s1", 2, "fix", 0.0),
        record("s1", 2, "cond8c", 1.0),
    ];
    Stage2Decode::new().run(&mut ctx).unwrap();

    let got: Vec<(&str, &str, u32)> = ctx
        .observations
        .iter()
        .map(|o| (o.froi.as_str(), o.series.as_str(), o.length))
        .collect();
    assert_eq!(
        got,
        vec![("LIFG", "C", 12), ("LIFG", "J", 4), ("LIFG", "N", 3)]
    );
    assert!(ctx.warnings.iter().any(|w| w.contains("not declared")));
}

#[test]
fn decode_stage_routes_six_words_by_suffix() {
    let out = TempDir::new().unwrap();
    let mut ctx = ctx("6words", MissingLengthPolicy::Reject, &out);
    ctx.records = vec![
        record("s1", 1, "8c_24wl", 1.0),
        record("s1", 1, "10c_30wl", 1.0),
    ];
    Stage2Decode::new().run(&mut ctx).unwrap();
    let got: Vec<(&str, u32)> = ctx
        .observations
        .iter()
        .map(|o| (o.series.as_str(), o.length))
        .collect();
    assert_eq!(got, vec![("WL24", 8), ("WL30", 10)]);
}

#[test]
fn missing_length_policy_decides_unit_fate() {
    let out = TempDir::new().unwrap();
    let rows = vec![record("s1", 2, "cond1c", 1.0), record("s1", 2, "jabc", 0.5)];

    let mut strict = ctx("nlength2", MissingLengthPolicy::Reject, &out);
    strict.records = rows.clone();
    let err = Stage2Decode::new().run(&mut strict).unwrap_err();
    assert!(format!("{:#}", err).contains("jabc"));

    let mut legacy = ctx("nlength2", MissingLengthPolicy::ZeroFillJabberwocky, &out);
    legacy.records = rows;
    Stage2Decode::new().run(&mut legacy).unwrap();
    assert_eq!(legacy.observations.len(), 1);
}

#[test]
fn unknown_roi_fails_decode() {
    let out = TempDir::new().unwrap();
    let mut ctx = ctx("nlength1", MissingLengthPolicy::Reject, &out);
    ctx.records = vec![record("s1", 13, "cond1c", 1.0)];
    let err = Stage2Decode::new().run(&mut ctx).unwrap_err();
    assert!(format!("{:#}", err).contains("ROI index 13"));
}
