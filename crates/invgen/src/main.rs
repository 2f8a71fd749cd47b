//! invgen CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "invgen")]
#[command(version)]
#[command(about = "Merge YAML metadata into host variables and Ansible inventory", long_about = None)]
struct Cli {
    /// Log progress (info level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Data directory containing hosts/ and metadata/
    #[arg(long, env = "INVGEN_SOURCE", default_value = "data/")]
    source: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate merged host files into <source>/generated/
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Require every host to declare the configured metadata types
        #[arg(long)]
        strict: bool,

        /// Attempt every host and report all failures at the end
        #[arg(long)]
        keep_going: bool,

        /// Remove <source>/generated/ before generating
        #[arg(long)]
        clean: bool,
    },

    /// Print the Ansible dynamic inventory built from generated host files
    Inventory {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the full inventory (default)
        #[arg(long, conflicts_with = "host")]
        list: bool,

        /// Print the variables of a single host
        #[arg(long, value_name = "NAME")]
        host: Option<String>,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn init_logging(verbose: bool, debug: bool) {
    let default_level = if debug {
        "invgen=debug,invgen_core=debug"
    } else if verbose {
        "invgen=info,invgen_core=info"
    } else {
        "invgen=warn,invgen_core=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    match cli.command {
        Commands::Generate {
            source,
            strict,
            keep_going,
            clean,
        } => commands::generate::execute(commands::generate::GenerateArgs {
            source: source.source,
            strict,
            keep_going,
            clean,
        }),
        Commands::Inventory {
            source,
            list: _,
            host,
            pretty,
        } => commands::inventory::execute(commands::inventory::InventoryArgs {
            source: source.source,
            host,
            pretty,
        }),
    }
}
