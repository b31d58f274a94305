use nlength::math::fdr::{FdrMethod, fdr_correct, stars};

const PVALS: [f64; 6] = [0.01, 0.04, 0.03, 0.2, 0.001, 0.5];

#[test]
fn adjusted_never_below_raw_and_monotone() {
    for method in [FdrMethod::Indep, FdrMethod::Negcorr] {
        let adj = fdr_correct(&PVALS, method);
        assert_eq!(adj.len(), PVALS.len());
        for (p, q) in PVALS.iter().zip(&adj) {
            assert!(q >= p);
            assert!(*q <= 1.0);
        }
        let mut order: Vec<usize> = (0..PVALS.len()).collect();
        order.sort_by(|&a, &b| PVALS[a].total_cmp(&PVALS[b]));
        for w in order.windows(2) {
            assert!(adj[w[0]] <= adj[w[1]]);
        }
    }
}

#[test]
fn single_p_value_is_unchanged() {
    assert_eq!(fdr_correct(&[0.03], FdrMethod::Indep), vec![0.03]);
    assert_eq!(fdr_correct(&[0.03], FdrMethod::Negcorr), vec![0.03]);
    assert!(fdr_correct(&[], FdrMethod::Negcorr).is_empty());
}

#[test]
fn benjamini_hochberg_values() {
    let adj = fdr_correct(&[0.01, 0.02, 0.03, 0.04], FdrMethod::Indep);
    for q in adj {
        assert!((q - 0.04).abs() < 1e-12);
    }
}

#[test]
fn negcorr_is_more_conservative() {
    let bh = fdr_correct(&PVALS, FdrMethod::Indep);
    let by = fdr_correct(&PVALS, FdrMethod::Negcorr);
    for (a, b) in bh.iter().zip(&by) {
        assert!(b >= a);
    }
    // c(2) = 1.5: [0.01, 0.02] -> [0.03, 0.03]
    let two = fdr_correct(&[0.01, 0.02], FdrMethod::Negcorr);
    assert!((two[0] - 0.03).abs() < 1e-12);
    assert!((two[1] - 0.03).abs() < 1e-12);
}

#[test]
fn star_thresholds() {
    assert_eq!(stars(0.5), "");
    assert_eq!(stars(0.1), ".");
    assert_eq!(stars(0.06), ".");
    assert_eq!(stars(0.05), "*");
    assert_eq!(stars(0.01), "**");
    assert_eq!(stars(0.002), "**");
    assert_eq!(stars(0.001), "***");
    assert_eq!(stars(0.0), "***");
}
