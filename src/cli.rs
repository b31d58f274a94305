use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::decode::MissingLengthPolicy;
use crate::math::fdr::FdrMethod;

#[derive(Debug, Parser)]
#[command(
    name = "nlength",
    version,
    about = "N-length contrasts and significance tables for language fROIs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute per-subject contrast tables for every parcel set x experiment
    Contrasts(ContrastsArgs),
    /// Test contrasts against zero and write the FDR-corrected table
    Signif(SignifArgs),
    /// Report one contrast across all tables as a single FDR family
    EffectTest(EffectTestArgs),
    /// Inspect the study configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ContrastsArgs {
    #[arg(long, help = "Base directory of the effect-size exports")]
    pub data: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    #[arg(long, help = "JSON overlay on the built-in study definition")]
    pub config: Option<PathBuf>,

    #[arg(long = "parcel-set", help = "Restrict to a parcel set (repeatable)")]
    pub parcel_sets: Vec<String>,

    #[arg(long = "experiment", help = "Restrict to an experiment (repeatable)")]
    pub experiments: Vec<String>,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,

    #[arg(
        long,
        value_enum,
        help = "Override every experiment's policy for labels without a length"
    )]
    pub missing_length: Option<MissingLengthArg>,
}

#[derive(Debug, Args)]
pub struct SignifArgs {
    #[arg(long, default_value = "contrasts")]
    pub contrasts: PathBuf,

    #[arg(long, default_value = "signif.csv")]
    pub out: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FdrMethodArg::Negcorr)]
    pub method: FdrMethodArg,

    #[arg(long = "import", help = "Externally computed rows to correct alongside (repeatable)")]
    pub imports: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EffectTestArgs {
    #[arg(long, default_value = "contrasts")]
    pub contrasts: PathBuf,

    #[arg(long, default_value = "S_v_N")]
    pub contrast: String,

    #[arg(long, default_value = "swjn.csv")]
    pub out: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Show(ConfigShowArgs),
}

#[derive(Debug, Args)]
pub struct ConfigShowArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingLengthArg {
    Reject,
    ZeroFillJabberwocky,
}

impl From<MissingLengthArg> for MissingLengthPolicy {
    fn from(arg: MissingLengthArg) -> Self {
        match arg {
            MissingLengthArg::Reject => Self::Reject,
            MissingLengthArg::ZeroFillJabberwocky => Self::ZeroFillJabberwocky,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FdrMethodArg {
    Negcorr,
    Indep,
}

impl From<FdrMethodArg> for FdrMethod {
    fn from(arg: FdrMethodArg) -> Self {
        match arg {
            FdrMethodArg::Negcorr => Self::Negcorr,
            FdrMethodArg::Indep => Self::Indep,
        }
    }
}
