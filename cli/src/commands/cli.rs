use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dagen", version, about = "Compile workflow specifications into orchestration scripts")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CompileArgs {
    /// Workflow specification (JSON).
    pub spec: PathBuf,

    /// Produce the local-debug script instead of the deployable one.
    #[arg(long)]
    pub local: bool,

    /// Restrict and order the local run-list. Can be specified multiple times.
    #[arg(long = "task", action = clap::ArgAction::Append, requires = "local")]
    pub tasks: Vec<String>,

    /// Output file. Defaults to `<deployment name>.py` in the current directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    pub spec: PathBuf,

    /// Tasks to run, in order. All tasks when omitted.
    #[arg(long = "task", action = clap::ArgAction::Append)]
    pub tasks: Vec<String>,

    /// Interpreter used for the generated script; overrides `[runner].interpreter`.
    #[arg(long)]
    pub python: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PublishArgs {
    pub spec: PathBuf,

    /// Target project profile; skips the interactive picker.
    #[arg(long)]
    pub profile: Option<String>,

    /// Overwrite an existing deployment without asking.
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[arg(long)]
    pub user_id: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ValidateArgs {
    pub spec: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a script from a specification.
    Compile(CompileArgs),
    /// Generate the local-debug script and execute it.
    Run(RunArgs),
    /// Upload the deployable script to the deployment API.
    Publish(PublishArgs),
    /// Check a specification and report every violation.
    Validate(ValidateArgs),
}
