use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands::{check_command, run_command, show_command};

#[derive(Parser)]
#[command(name = "nbrun")]
#[command(version, about = "Execute a notebook as a batch training step")]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute every cell of a notebook under a kernel
    #[command(visible_alias = "r")]
    Run(RunArgs),
    /// Run only the pre-flight environment diagnostics
    Check,
    /// Load and summarize a notebook without running it
    Show {
        /// Path to the notebook file
        notebook: String,

        /// Print the summary as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the notebook file
    pub notebook: String,

    /// Named profile from nbrun.toml (overrides kernel/workdir/timeout)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Kernel name; the documented default is python3
    #[arg(short, long, default_value = "python3")]
    pub kernel: String,

    /// Working directory for the run
    #[arg(short, long, default_value = ".")]
    pub workdir: String,

    /// Whole-run timeout in seconds
    #[arg(short, long, default_value_t = 600)]
    pub timeout: u64,

    /// Run environment diagnostics before executing
    #[arg(long)]
    pub preflight: bool,

    /// Write the executed notebook to this path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Show the resolved configuration without executing
    #[arg(short, long)]
    pub dry_run: bool,
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Run(args) => run_command(args),
            Commands::Check => check_command(),
            Commands::Show { notebook, json } => show_command(&notebook, json),
        }
    }
}
