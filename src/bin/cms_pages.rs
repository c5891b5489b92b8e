//! cms-pages: resolve CMS pages from the command line
//!
//! ## Commands
//!
//! - **resolve**: assemble a page and print its items in author order
//! - **plan**: show the per-type batches a page would need, without fetching them
//! - **types**: list the content types the resolver knows
//!
//! ## Example Usage
//!
//! ```bash
//! # Resolve the home page against the delivery API (CONTENTFUL_* from env or .env)
//! cms-pages resolve home
//!
//! # Draft content, German locale, JSON output
//! cms-pages resolve home --locale de-DE --preview --json
//!
//! # Dry run against a local fixture
//! cms-pages --fixture pages.json plan home
//! ```
//!
//! Exit status is 2 when the page does not exist and 1 for any other failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod pages_cli;

use pages_cli::{output, plan::PlanCmd, resolve::ResolveCmd, types::TypesCmd, PagesContext};

#[derive(Parser)]
#[command(
    name = "cms-pages",
    author,
    version,
    about = "Assemble CMS pages from their section references",
    long_about = "Fetches a page shell, resolves every referenced section with one batched \
                  request per content type, and prints the sections in author order."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GraphQL endpoint override (default: derived from CONTENTFUL_SPACE_ID)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Answer from a JSON fixture file instead of the network
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a page and print its items
    Resolve(ResolveCmd),

    /// Show the fetch plan for a page without fetching entries
    Plan(PlanCmd),

    /// List known content types
    Types(TypesCmd),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Commands, ctx: &PagesContext, json: bool, verbose: bool) -> Result<()> {
    match command {
        Commands::Resolve(cmd) => cmd.execute(ctx, json, verbose).await,
        Commands::Plan(cmd) => cmd.execute(ctx, json).await,
        Commands::Types(cmd) => cmd.execute(json),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli {
        command,
        endpoint,
        fixture,
        json,
        verbose,
    } = Cli::parse();

    dotenv::dotenv().ok();
    init_tracing(verbose);

    let ctx = PagesContext { endpoint, fixture };
    match run(command, &ctx, json, verbose).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", output::format_error(&err, json));
            ExitCode::from(output::exit_code(&err))
        }
    }
}
