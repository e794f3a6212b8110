//! mygit command-line interface

mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mygit_core::{AddOutcome, Repository};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mygit")]
#[command(author = "mygit Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A small local version control system")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Working directory of the repository
    #[arg(short = 'C', long = "dir", default_value = ".", global = true)]
    dir: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new repository
    Init,

    /// Stage a file, or every file with "."
    Add { name: String },

    /// Unstage a file and, if tracked, delete it and mark it for removal
    Rm { name: String },

    /// Record staged changes as a new commit
    Commit { message: String },

    /// Show history from the head back to the initial commit
    Log,

    /// Print the ids of commits with the given message
    Find { message: String },

    /// Show staged, removed, modified and untracked files
    Status,

    /// Compare two commits
    Diff { from: String, to: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let root = cli.dir.as_path();

    match cli.command {
        Commands::Init => cmd_init(root, &mut out),
        Commands::Add { name } => cmd_add(root, &name),
        Commands::Rm { name } => cmd_rm(root, &name),
        Commands::Commit { message } => cmd_commit(root, &message),
        Commands::Log => cmd_log(root, &mut out),
        Commands::Find { message } => cmd_find(root, &message, &mut out),
        Commands::Status => cmd_status(root, &mut out),
        Commands::Diff { from, to } => cmd_diff(root, &from, &to, &mut out),
    }
}

/// Log to stderr so command output on stdout stays clean
fn init_tracing(debug: bool) {
    let env_filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_init(root: &Path, out: &mut dyn Write) -> Result<()> {
    let already = Repository::is_initialized(root);
    let repo = Repository::init(root)
        .with_context(|| format!("Failed to initialize repository at {}", root.display()))?;
    if already {
        writeln!(out, "Repository already initialized at {}", repo.dir().display())?;
    } else {
        writeln!(out, "Initialized empty repository in {}", repo.dir().display())?;
    }
    Ok(())
}

fn cmd_add(root: &Path, name: &str) -> Result<()> {
    let repo = Repository::open(root)?;
    let mut state = repo.load_state()?;
    if name == "." {
        let outcomes = repo.add_all(&mut state)?;
        let staged = outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == AddOutcome::Staged)
            .count();
        tracing::debug!("Staged {} of {} files", staged, outcomes.len());
    } else {
        let outcome = repo.add(&mut state, name)?;
        tracing::debug!("add {}: {:?}", name, outcome);
    }
    repo.save_state(&state)?;
    Ok(())
}

fn cmd_rm(root: &Path, name: &str) -> Result<()> {
    let repo = Repository::open(root)?;
    let mut state = repo.load_state()?;
    repo.remove(&mut state, name)?;
    repo.save_state(&state)?;
    Ok(())
}

fn cmd_commit(root: &Path, message: &str) -> Result<()> {
    let repo = Repository::open(root)?;
    let mut state = repo.load_state()?;
    repo.commit(&mut state, message)?;
    repo.save_state(&state)?;
    Ok(())
}

fn cmd_log(root: &Path, out: &mut dyn Write) -> Result<()> {
    let repo = Repository::open(root)?;
    let state = repo.load_state()?;
    for commit in repo.history(&state) {
        output::write_log_entry(out, &commit?)?;
    }
    Ok(())
}

fn cmd_find(root: &Path, message: &str, out: &mut dyn Write) -> Result<()> {
    let repo = Repository::open(root)?;
    let state = repo.load_state()?;
    let found = repo.find(&state, message)?;
    output::write_find(out, &found)?;
    Ok(())
}

fn cmd_status(root: &Path, out: &mut dyn Write) -> Result<()> {
    let repo = Repository::open(root)?;
    let state = repo.load_state()?;
    let status = repo.status(&state)?;
    output::write_status(out, &status)?;
    Ok(())
}

fn cmd_diff(root: &Path, from: &str, to: &str, out: &mut dyn Write) -> Result<()> {
    let repo = Repository::open(root)?;
    let diff = repo.diff(from, to)?;
    output::write_diff(out, &diff)?;
    Ok(())
}
