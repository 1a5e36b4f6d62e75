//! Folio CLI
//!
//! Static personal site builder driven by typed design tokens.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for folio.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "A static personal site builder driven by design tokens"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory (overrides build.output_dir)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Override site origin (e.g., https://example.com)
        #[arg(long)]
        origin: Option<String>,
    },
    /// Validate configuration and design tokens
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
        /// Report divergence against another token file
        #[arg(long, value_name = "FILE")]
        against: Option<std::path::PathBuf>,
    },
    /// Write the canonical configuration and tokens into a directory
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: std::path::PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    folio::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { output, origin } => {
            folio::cmd::build::run(&cli.config, output.as_deref(), origin.as_deref())?;
        }
        Commands::Check { strict, against } => {
            folio::cmd::check::run(&cli.config, strict, against.as_deref())?;
        }
        Commands::Init { dir } => {
            folio::cmd::init::run(&dir)?;
        }
    }

    Ok(())
}
