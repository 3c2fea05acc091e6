mod cmd;
mod output;
mod root;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cmd::params::ParamsSubcommand;

#[derive(Parser)]
#[command(
    name = "recipe",
    about = "Recipe text analysis: entity tagging, cooking time, difficulty and flow graphs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: nearest directory with recipe.yaml, else cwd)
    #[arg(long, global = true, env = "RECIPE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (default: server.port from recipe.yaml)
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },

    /// Tag recipe text with KyTea (reads stdin when TEXT is omitted)
    Tag { text: Option<String> },

    /// Inspect or reset the action-time table
    Params {
        #[command(subcommand)]
        subcommand: ParamsSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Tag { text } => cmd::tag::run(&root, text, cli.json),
        Commands::Params { subcommand } => cmd::params::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
