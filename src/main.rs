use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use tracing::info;

use book_rename::logging;
use book_rename::rename_engine::{ConfigBuilder, RenameEngine, Session};
use book_rename::report::{self, ExecutionSummary};
use book_rename::sanitize::DEFAULT_MAX_AUTHORS;
use book_rename::tui::{self, TuiOptions};

/// Rename PDF, DOCX, EPUB and TXT files to "Author - Title" using their metadata.
#[derive(Debug, Parser)]
#[command(name = "book-rename", version, about)]
struct Cli {
    /// Folder to process (not recursive)
    directory: Option<PathBuf>,

    /// Print the proposed renames and exit without touching any file
    #[arg(long, conflicts_with = "yes")]
    dry_run: bool,

    /// Rename without the interactive preview
    #[arg(short = 'y', long)]
    yes: bool,

    /// Emit a JSON report instead of a table (with --dry-run or --yes)
    #[arg(long)]
    json: bool,

    /// Rename dot-files too (without this they are listed as hidden and skipped)
    #[arg(long)]
    include_hidden: bool,

    /// Fall back to parsing "Author - Title" from the filename when a file has no metadata
    #[arg(long)]
    guess_from_filename: bool,

    /// Authors to keep in a filename before "et al."
    #[arg(long, default_value_t = DEFAULT_MAX_AUTHORS, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_authors: usize,

    /// Log file used while the interactive interface is running
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.dry_run || cli.yes {
        logging::init_stderr()?;
        return run_batch(&cli);
    }

    let log_file = cli.log_file.clone().unwrap_or_else(logging::default_log_file);
    logging::init_file(&log_file)?;
    info!(log_file = %log_file.display(), "starting interactive session");

    tui::run_tui(TuiOptions {
        directory: cli.directory,
        include_hidden: cli.include_hidden,
        guess_from_filename: cli.guess_from_filename,
        max_authors: cli.max_authors,
    })
    .await?;
    Ok(ExitCode::SUCCESS)
}

fn run_batch(cli: &Cli) -> Result<ExitCode> {
    let directory = cli
        .directory
        .as_ref()
        .context("A directory is required with --dry-run or --yes")?;

    let config = ConfigBuilder::new()
        .directory(directory)
        .include_hidden(cli.include_hidden)
        .guess_from_filename(cli.guess_from_filename)
        .max_authors(cli.max_authors)
        .build()?;

    let mut session = Session::new(RenameEngine::new(config));
    let plan = session
        .refresh()
        .with_context(|| format!("Failed to plan renames in {:?}", directory))?
        .clone();

    if cli.dry_run {
        if cli.json {
            println!("{}", report::plan_json(&plan)?);
        } else {
            print!("{}", report::plan_table(&plan));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let results = session.execute();
    if cli.json {
        println!("{}", report::execution_json(&plan, results)?);
    } else {
        print!("{}", report::execution_table(results));
    }

    if ExecutionSummary::of(results).failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
