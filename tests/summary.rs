use std::fs;

use nlength::io::summary::{RunSummary, UnitReport, UnitStatus, format_summary, write_run_summary};
use serde_json::Value;
use tempfile::TempDir;

fn unit(ps: &str, status: UnitStatus, error: Option<&str>) -> UnitReport {
    UnitReport {
        parcel_set: ps.to_string(),
        experiment: "nlength1".to_string(),
        status,
        error: error.map(str::to_string),
        contrast_file: None,
        profile_file: None,
        n_subjects: 16,
        n_frois: 6,
        contrasts: vec!["C".to_string(), "NLenC".to_string()],
        warnings: Vec::new(),
    }
}

#[test]
fn summary_text_lists_units() {
    let mut ok = unit("evlab", UnitStatus::Ok, None);
    ok.warnings.push("C in LIFG: 4 of 5 lengths present".to_string());
    let summary = RunSummary::new(vec![ok, unit("PDD", UnitStatus::Failed, Some("input missing"))]);
    assert_eq!(summary.failed().count(), 1);

    let text = format_summary(&summary);
    assert!(text.contains("evlab_nlength1: ok (16 subjects, 6 fROIs, 2 contrasts)"));
    assert!(text.contains("PDD_nlength1: FAILED: input missing"));
    assert!(text.contains("- evlab_nlength1: C in LIFG: 4 of 5 lengths present"));
}

#[test]
fn summary_json_fields() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("run_summary.json");
    let summary = RunSummary::new(vec![unit("PDD", UnitStatus::Failed, Some("boom"))]);
    write_run_summary(&path, &summary).unwrap();

    let v: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(v["tool"]["name"], "nlength");
    assert!(v["tool"]["version"].is_string());
    assert_eq!(v["units"][0]["status"], "failed");
    assert_eq!(v["units"][0]["error"], "boom");
    assert!(v["units"][0]["contrast_file"].is_null());
}
