//! Command-line interface for level imports.
//!
//! Runs the same import pipeline the drop hook uses, for archives named on
//! the command line instead of dropped on the game window.

use clap::{Parser, Subcommand};
use ingest::validate::validate_content_dir;
use ingest::{
    resolve_target_base, ArchiveImporter, BatchSummary, ImportPipeline, LibraryRefresher,
    SessionImportTracker, Settings,
};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::info;

/// Exit status when some archives in a batch failed.
const EXIT_PARTIAL_FAILURE: i32 = 2;

#[derive(Parser)]
#[command(name = "wipdrop")]
#[command(version, about = "Import work-in-progress level archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one or more level archives
    Import {
        /// Game install directory
        #[arg(short, long)]
        root: PathBuf,

        /// Archive files to import
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Size limit in bytes, overriding the saved setting
        #[arg(long)]
        size_limit: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a directory holds a complete level
    Validate {
        /// Directory to check
        dir: PathBuf,
    },

    /// Print (and create) the managed levels directory
    Resolve {
        /// Game install directory
        #[arg(short, long)]
        root: PathBuf,
    },
}

/// The CLI has no level library to rescan; it just notes the request.
struct LogRefresher;

impl LibraryRefresher for LogRefresher {
    fn refresh(&self) {
        info!("level library refresh requested");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            root,
            archives,
            size_limit,
            json,
        } => handle_import(&root, &archives, size_limit, json),
        Commands::Validate { dir } => handle_validate(&dir),
        Commands::Resolve { root } => handle_resolve(&root),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn handle_import(
    root: &Path,
    archives: &[PathBuf],
    size_limit: Option<u64>,
    json: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = Settings::load(&Settings::path_for_root(root))?;
    let mut options = settings.import_options();
    if size_limit.is_some() {
        options.size_limit_bytes = size_limit;
    }

    let target = resolve_target_base(root)?;
    let pipeline = ImportPipeline::new(
        ArchiveImporter::new(options),
        target,
        Arc::new(SessionImportTracker::new()),
        Arc::new(LogRefresher),
    );
    let summary = pipeline.process_batch(archives);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(if summary.failed > 0 {
        EXIT_PARTIAL_FAILURE
    } else {
        0
    })
}

fn print_summary(summary: &BatchSummary) {
    for outcome in &summary.outcomes {
        match (&outcome.target_directory, outcome.failure) {
            (Some(target), None) => println!(
                "imported  {} -> {}",
                outcome.source_path.display(),
                target.display()
            ),
            (_, Some(kind)) => println!("failed    {} ({})", outcome.source_path.display(), kind),
            (None, None) => println!("unknown   {}", outcome.source_path.display()),
        }
    }
    println!(
        "{} imported, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );
}

fn handle_validate(dir: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let report = validate_content_dir(dir)?;
    println!("descriptor: {}", report.has_descriptor);
    println!("audio:      {}", report.has_audio);
    println!("difficulty: {}", report.has_difficulty);

    if report.is_valid() {
        println!("{} is a valid level", dir.display());
        Ok(0)
    } else {
        println!("{} is not a valid level", dir.display());
        Ok(EXIT_PARTIAL_FAILURE)
    }
}

fn handle_resolve(root: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let target = resolve_target_base(root)?;
    println!("{}", target.display());
    Ok(0)
}
