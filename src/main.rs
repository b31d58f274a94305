use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nlength::cli::{Cli, Commands, ConfigCommand, ContrastsArgs, EffectTestArgs, SignifArgs};
use nlength::config::{self, Named, StudyConfig};
use nlength::io::signif_table::{read_signif_import, write_effect_test, write_signif};
use nlength::io::summary::{RunSummary, format_summary, write_run_summary};
use nlength::runner::{RunOptions, run_study};
use nlength::signif::build_significance;
use nlength::signif::effect_test::effect_test;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Contrasts(args) => handle_contrasts(args)?,
        Commands::Signif(args) => handle_signif(args)?,
        Commands::EffectTest(args) => handle_effect_test(args)?,
        Commands::Config(args) => match args.command {
            ConfigCommand::Show(show) => {
                let study = config::load_study(show.config.as_deref())?;
                print_study(&study);
            }
        },
    }

    Ok(())
}

fn handle_contrasts(args: ContrastsArgs) -> Result<()> {
    let mut study = config::load_study(args.config.as_deref())?;
    if let Some(policy) = args.missing_length {
        for exp in study.experiments.iter_mut() {
            exp.missing_length = policy.into();
        }
    }
    let data_path = args
        .data
        .or_else(|| study.data_path.clone())
        .context("data path not set; pass --data or set data_path in --config")?;

    let opts = RunOptions {
        data_path,
        out_dir: args.out,
        parcel_sets: args.parcel_sets,
        experiments: args.experiments,
        threads: args.threads,
    };
    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("failed to create {}", opts.out_dir.display()))?;

    let reports = run_study(&study, &opts)?;
    let summary = RunSummary::new(reports);
    write_run_summary(&opts.out_dir.join("run_summary.json"), &summary)?;
    print!("{}", format_summary(&summary));

    let failed = summary.failed().count();
    if failed > 0 {
        anyhow::bail!("{} of {} units failed", failed, summary.units.len());
    }
    Ok(())
}

fn handle_signif(args: SignifArgs) -> Result<()> {
    let study = config::load_study(args.config.as_deref())?;
    let mut imported = Vec::new();
    for path in &args.imports {
        imported.extend(read_signif_import(path)?);
    }
    let rows = build_significance(&study, &args.contrasts, imported, args.method.into())?;
    write_signif(&args.out, &rows)?;
    let significant = rows.iter().filter(|r| r.p_fdr <= 0.05).count();
    println!(
        "signif: {} rows ({} with p_fdr <= 0.05) written to {}",
        rows.len(),
        significant,
        args.out.display()
    );
    Ok(())
}

fn handle_effect_test(args: EffectTestArgs) -> Result<()> {
    let study = config::load_study(args.config.as_deref())?;
    let rows = effect_test(&study, &args.contrasts, &args.contrast)?;
    write_effect_test(&args.out, &rows)?;
    println!(
        "effect-test {}: {} rows written to {}",
        args.contrast,
        rows.len(),
        args.out.display()
    );
    Ok(())
}

fn print_study(study: &StudyConfig) {
    println!("parcel sets:");
    for ps in &study.parcel_sets {
        println!(
            "{}\t{}\t{} fROIs\tnetwork: {}",
            ps.name,
            ps.data_dir,
            ps.frois.len(),
            ps.network.join(",")
        );
    }
    println!("experiments:");
    for exp in &study.experiments {
        let series: Vec<String> = exp
            .series
            .iter()
            .map(|s| {
                let lengths: Vec<String> = s.lengths.iter().map(|l| l.to_string()).collect();
                format!("{}[{}]", s.name, lengths.join(","))
            })
            .collect();
        let applicable = exp.applicable_contrasts(&study.contrasts);
        let contrasts: Vec<&str> = applicable.iter().map(|c| c.name()).collect();
        println!("{}\t{}\t{}", exp.name, series.join(" "), contrasts.join(","));
    }
}
