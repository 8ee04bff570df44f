//! typedex CLI - scan a descriptor corpus and query the resulting index.
//!
//! Usage:
//!   typedex --root <dir> stats               # Scan and print index stats
//!   typedex --root <dir> subtypes <key>      # Transitive subtypes of a type
//!   typedex --root <dir> tagged <tag>        # Types carrying a tag
//!   typedex --root <dir> lookup <idx> <key>  # Raw index lookup
//!   typedex --root <dir> export              # Dump the store as JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use typedex::{
    ConfigBuilder, FilterChain, SubTypesScanner, TaggedTypesScanner, TypeIndex,
};

#[derive(Parser)]
#[command(name = "typedex")]
#[command(about = "Queryable structural index over type-descriptor corpora", long_about = None)]
struct Cli {
    /// Artifact root(s) to scan (repeatable)
    #[arg(short, long, default_value = ".")]
    root: Vec<PathBuf>,

    /// Include pattern for the input filter (repeatable, anchored regex)
    #[arg(long)]
    include: Vec<String>,

    /// Exclude pattern for the input filter (repeatable, anchored regex)
    #[arg(long)]
    exclude: Vec<String>,

    /// Scan roots sequentially instead of in parallel
    #[arg(long)]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the corpus and print index statistics
    Stats,

    /// List all transitive subtypes of a type
    Subtypes {
        /// Fully-qualified type key
        key: String,
    },

    /// List all types carrying a metadata tag
    Tagged {
        /// Fully-qualified tag name
        tag: String,
    },

    /// Raw lookup: direct values under a key in a named index
    Lookup {
        /// Index name (e.g. SubTypes, TypesTagged)
        index: String,
        /// Key to look up
        key: String,
    },

    /// Dump the whole store as JSON
    Export,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut filter = FilterChain::new();
    for pattern in &cli.include {
        filter = filter
            .include(pattern)
            .with_context(|| format!("bad --include pattern '{pattern}'"))?;
    }
    for pattern in &cli.exclude {
        filter = filter
            .exclude(pattern)
            .with_context(|| format!("bad --exclude pattern '{pattern}'"))?;
    }

    let config = ConfigBuilder::new()
        .add_roots(&cli.root)
        .add_scanner(SubTypesScanner::new())
        .add_scanner(TaggedTypesScanner::new())
        .filter_inputs_by(filter)
        .parallel(!cli.sequential)
        // No resolver on the command line; repair needs an embedding caller.
        .expand_super_types(false)
        .build()
        .context("invalid configuration")?;

    let index = TypeIndex::new(config);

    match cli.command {
        Commands::Stats => {
            println!("{}", index.stats());
        }
        Commands::Subtypes { key } => {
            for name in index.sub_types_of(&key) {
                println!("{name}");
            }
        }
        Commands::Tagged { tag } => {
            for name in index.types_with_tag(&tag) {
                println!("{name}");
            }
        }
        Commands::Lookup { index: idx, key } => {
            for name in index.store().lookup(&idx, &key) {
                println!("{name}");
            }
        }
        Commands::Export => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), index.store())
                .context("could not serialize store")?;
            println!();
        }
    }

    Ok(())
}
