use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "funnel")]
#[command(about = "Funnel - step flow engine for multi-step onboarding quizzes", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the step registry
    Steps {
        /// Print as a registry file instead of a table
        #[arg(long)]
        toml: bool,
        /// Write the registry to a file, ready to edit and point `registry` at
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },
    /// Walk the funnel interactively
    Walk {
        /// Slug of the first step, as if opened from a link
        #[arg(long)]
        start: Option<String>,
        /// Seed for the analysis animations
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Apply a JSON-lines event script and print the outcome
    Replay {
        script: PathBuf,
        /// Print every presentation call to stderr
        #[arg(long)]
        trace: bool,
        /// Run analysis animations with minimal delays
        #[arg(long)]
        fast: bool,
        /// Seed for the analysis animations
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the effective configuration
    Config {
        /// Write the defaults to the configuration file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let context = commands::AppContext::load(cli.config)?;

    match cli.command {
        Commands::Steps { toml, export } => commands::steps::run(&context, toml, export.as_deref())?,
        Commands::Walk { start, seed } => commands::walk::run(&context, start.as_deref(), seed).await?,
        Commands::Replay {
            script,
            trace,
            fast,
            seed,
        } => commands::replay::run(&context, &script, trace, fast, seed).await?,
        Commands::Config { init } => commands::config::run(&context, init)?,
    }

    Ok(())
}
