use nlength::math::stats::{mean, sample_std, sem, ttest_1samp};

#[test]
fn descriptive_basics() {
    let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert!((mean(&v) - 5.0).abs() < 1e-12);
    let sd = (32.0f64 / 7.0).sqrt();
    assert!((sample_std(&v) - sd).abs() < 1e-12);
    assert!((sem(&v) - sd / 8f64.sqrt()).abs() < 1e-12);
    assert!(mean(&[]).is_nan());
    assert!(sample_std(&[1.0]).is_nan());
}

#[test]
fn one_sample_t_test() {
    let v = [1.0, 2.0, 3.0, 4.0, 5.0];
    let tt = ttest_1samp(&v).unwrap();
    let sd = 2.5f64.sqrt();
    assert_eq!(tt.n, 5);
    assert!((tt.mean - 3.0).abs() < 1e-12);
    assert!((tt.se - sd / 5f64.sqrt()).abs() < 1e-12);
    assert!((tt.t - 3.0 / (sd / 5f64.sqrt())).abs() < 1e-9);
    assert_eq!(tt.df, 4.0);
    assert!((tt.d - 3.0 / sd).abs() < 1e-12);
    // t = 4.2426 on 4 df
    assert!(tt.p > 0.01 && tt.p < 0.015);
}

#[test]
fn symmetric_sample_has_p_one() {
    let tt = ttest_1samp(&[-1.0, 1.0, -2.0, 2.0]).unwrap();
    assert!(tt.t.abs() < 1e-12);
    assert!((tt.p - 1.0).abs() < 1e-9);
}

#[test]
fn undefined_cases() {
    assert!(ttest_1samp(&[1.0]).is_none());
    assert!(ttest_1samp(&[2.0, 2.0, 2.0]).is_none());
    assert!(ttest_1samp(&[1.0, f64::NAN]).is_none());
}
