//! labsync: publish generated files to GitLab projects and mirror them locally.
//!
//! # Usage
//!
//! ```text
//! labsync sync
//! labsync publish <project> <remote-path> --from <file>
//! labsync publish-many <project> --file <remote-path>=<local-file>...
//! labsync tag <project> [--ensure]
//! labsync tag --id <project-id>
//! labsync projects [--json]
//! labsync show <project> <tag> <path>
//! ```
//!
//! Settings come from `~/.labsync/config.yaml` (or `--config`); tokens come
//! from `LABSYNC_PRIVATE_TOKEN` and `CI_JOB_TOKEN`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    projects::ProjectsArgs,
    publish::{PublishArgs, PublishManyArgs},
    show::ShowArgs,
    sync::SyncArgs,
    tag::TagArgs,
    Context,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "labsync",
    version,
    about = "Publish generated files to GitLab projects and keep local mirrors in sync",
    long_about = None,
)]
struct Cli {
    /// Settings file to use instead of ~/.labsync/config.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pull existing local checkouts and clone missing projects.
    Sync(SyncArgs),

    /// Create or update one file on a project's branch, then tag it.
    Publish(PublishArgs),

    /// Publish several files to one project as a single commit, then tag it.
    PublishMany(PublishManyArgs),

    /// Stamp the next integer tag on a project's branch head.
    Tag(TagArgs),

    /// List every project discovered under the configured groups.
    Projects(ProjectsArgs),

    /// Print a JSON file from a project as of a tag.
    Show(ShowArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = Context::new(cli.config);
    match cli.command {
        Commands::Sync(args) => args.run(&ctx),
        Commands::Publish(args) => args.run(&ctx),
        Commands::PublishMany(args) => args.run(&ctx),
        Commands::Tag(args) => args.run(&ctx),
        Commands::Projects(args) => args.run(&ctx),
        Commands::Show(args) => args.run(&ctx),
    }
}

/// Logs go to stderr so command output on stdout stays pipeable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
