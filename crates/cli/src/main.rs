mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scenebook_core::catalog::IdPolicy;
use scenebook_core::config::Config;
use scenebook_core::Workbench;
use tracing_subscriber::EnvFilter;

/// Scenebook — build step-by-step manuals from scene images
#[derive(Parser)]
#[command(name = "scenebook", version, about)]
struct Cli {
    /// Directory holding `scenes/` and the manual file
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Name new images with random tokens instead of content hashes (no deduplication)
    #[arg(long)]
    random_ids: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List scene images, or add new ones
    Scenes {
        #[command(subcommand)]
        action: Option<ScenesAction>,
    },
    /// Show the manual, or register and reset steps
    Steps {
        #[command(subcommand)]
        action: Option<StepsAction>,
    },
    /// Show how many scenes and steps are stored
    Status,
    /// Re-hash stored scenes and report files whose content changed
    Verify,
    /// Write the manual as a Markdown document
    Export {
        /// Output file
        path: PathBuf,
        /// Document title
        #[arg(long, default_value = "Manual")]
        title: String,
    },
}

#[derive(Subcommand)]
enum ScenesAction {
    /// Store image files in the catalog (duplicates are not stored twice)
    Add {
        /// Image files (PNG, JPEG, WebP, TIFF)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StepsAction {
    /// Append a step for a stored scene
    Add {
        /// Scene file name as shown by `scenebook scenes`
        image: String,
        /// Step description (defaults to a generated one)
        #[arg(long)]
        text: Option<String>,
    },
    /// Remove every registered step
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let policy = if cli.random_ids {
        IdPolicy::RandomToken
    } else {
        IdPolicy::ContentHash
    };
    let bench = Workbench::open(Config::at(&cli.root).with_id_policy(policy))?;

    match cli.command {
        Commands::Scenes { action } => match action {
            None => commands::scenes::list(&bench)?,
            Some(ScenesAction::Add { files }) => commands::scenes::add(&bench, &files)?,
        },
        Commands::Steps { action } => match action {
            None => commands::steps::show(&bench)?,
            Some(StepsAction::Add { image, text }) => {
                commands::steps::add(&bench, &image, text)?
            }
            Some(StepsAction::Reset { yes }) => commands::steps::reset(&bench, yes)?,
        },
        Commands::Status => commands::status::run(&bench)?,
        Commands::Verify => commands::verify::run(&bench)?,
        Commands::Export { path, title } => commands::export::run(&bench, &path, &title)?,
    }

    Ok(())
}
