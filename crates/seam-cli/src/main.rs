mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    build_recon::BuildReconArgs, config::ConfigSubcommand, dtiqa::DtiqaArgs,
    freesurfer::FreesurferSubcommand, fsl::FslSubcommand, xvfb::XvfbWrapArgs,
};

#[derive(Parser)]
#[command(
    name = "seam",
    about = "A simple layer between neuroimaging tools and your data",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an opinionated & complete FreeSurfer recon script
    #[command(
        name = "build-recon",
        after_help = "Trailing arguments (after `--`) are passed to recon-all"
    )]
    BuildRecon(BuildReconArgs),

    /// Print a single FreeSurfer command
    Freesurfer {
        #[command(subcommand)]
        subcommand: FreesurferSubcommand,
    },

    /// Print a single FSL command
    Fsl {
        #[command(subcommand)]
        subcommand: FslSubcommand,
    },

    /// Generate MATLAB m-code that runs DTI_QA
    Dtiqa(DtiqaArgs),

    /// Wrap a command in xvfb-run for headless execution
    XvfbWrap(XvfbWrapArgs),

    /// Create and validate recipe config files
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::BuildRecon(args) => cmd::build_recon::run(args, cli.json),
        Commands::Freesurfer { subcommand } => cmd::freesurfer::run(subcommand, cli.json),
        Commands::Fsl { subcommand } => cmd::fsl::run(subcommand, cli.json),
        Commands::Dtiqa(args) => cmd::dtiqa::run(args, cli.json),
        Commands::XvfbWrap(args) => cmd::xvfb::run(args, cli.json),
        Commands::Config { subcommand } => cmd::config::run(subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
