//! Main CLI application structure

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use super::output::{Output, OutputFormat};
use super::{query, task};
use crate::logging;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "taskdeps")]
#[command(author, version, about = "Task tracking with dependency ordering")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new taskdeps project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage tasks and their dependencies
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Show incomplete tasks with every dependency complete
    Ready,

    /// Show blocked tasks, or what blocks a single task
    Blocked {
        /// Task ID
        id: Option<String>,
    },

    /// Check the task graph for cycles, missing tasks, and bad completions
    Check,

    /// Print every task in dependency order
    Order,
}

/// Main entry point for the CLI
///
/// Failures are reported through [`Output::error`], so `--format json`
/// callers get a JSON error object on stderr.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let format = match cli.format {
        Some(format) => Ok(format),
        None => Config::load().map(|config| config.global.default_format),
    };
    let output = Output::new(format.as_ref().copied().unwrap_or_default());

    let result = format.and_then(|format| {
        debug!(?format, "taskdeps starting");
        execute(cli.command, &output)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            let project = Project::init(&path)?;
            debug!(dir = %project.data_dir().display(), "created project directory");
            output.success(&format!(
                "Initialized taskdeps project at {}",
                project.root().display()
            ));
        }

        Commands::Task(cmd) => task::run(cmd, output)?,

        Commands::Ready => query::ready(output)?,
        Commands::Blocked { id } => query::blocked(output, id.as_deref())?,
        Commands::Check => query::check(output)?,
        Commands::Order => query::order(output)?,
    }

    debug!("command completed");
    Ok(())
}
