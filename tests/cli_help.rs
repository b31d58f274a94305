use assert_cmd::Command;
use clap::Parser;
use nlength::cli::{Cli, Commands, FdrMethodArg, MissingLengthArg};

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("nlength").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn contrasts_args_parse() {
    let cli = Cli::try_parse_from([
        "nlength",
        "contrasts",
        "--data",
        "/data",
        "--parcel-set",
        "evlab",
        "--parcel-set",
        "RH",
        "--missing-length",
        "zero-fill-jabberwocky",
    ])
    .unwrap();
    let Commands::Contrasts(args) = cli.command else {
        panic!("expected contrasts");
    };
    assert_eq!(args.parcel_sets, vec!["evlab", "RH"]);
    assert!(args.experiments.is_empty());
    assert_eq!(args.threads, 0);
    assert_eq!(args.out, std::path::PathBuf::from("."));
    assert_eq!(
        args.missing_length,
        Some(MissingLengthArg::ZeroFillJabberwocky)
    );
}

#[test]
fn signif_defaults() {
    let cli = Cli::try_parse_from(["nlength", "signif"]).unwrap();
    let Commands::Signif(args) = cli.command else {
        panic!("expected signif");
    };
    assert_eq!(args.method, FdrMethodArg::Negcorr);
    assert_eq!(args.contrasts, std::path::PathBuf::from("contrasts"));
    assert_eq!(args.out, std::path::PathBuf::from("signif.csv"));
    assert!(args.imports.is_empty());

    let cli = Cli::try_parse_from(["nlength", "effect-test"]).unwrap();
    let Commands::EffectTest(args) = cli.command else {
        panic!("expected effect-test");
    };
    assert_eq!(args.contrast, "S_v_N");
    assert_eq!(args.out, std::path::PathBuf::from("swjn.csv"));
}

#[test]
fn config_show_lists_units() {
    let out = Command::cargo_bin("nlength")
        .unwrap()
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("evlab"));
    assert!(stdout.contains("nlength2\tC[1,2,3,4,6,12] J[1,4,12] N[3,4]"));
    assert!(stdout.contains("NLen6words"));
}
