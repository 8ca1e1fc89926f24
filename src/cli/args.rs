//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Merge per-entity permission hierarchies into one classified dendrogram
#[derive(Parser, Debug)]
#[command(name = "dendromerge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the dendrogram and print it as JSON
    Build {
        /// Entities to merge, in order (default: configured entities)
        entities: Vec<String>,
        /// Seed for the random source
        #[arg(short, long)]
        seed: Option<u64>,
        /// Write JSON to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Pretty-print JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show the dendrogram as a coloured tree
    Tree {
        /// Entities to merge, in order (default: configured entities)
        entities: Vec<String>,
        /// Seed for the random source
        #[arg(short, long)]
        seed: Option<u64>,
        /// Omit the category legend and counts
        #[arg(long)]
        no_legend: bool,
    },

    /// Show the generated hierarchy of a single entity
    Entity {
        /// Entity name
        name: String,
        /// Seed for the random source
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Aggregate categories over many independent builds
    Stats {
        /// Entities to merge, in order (default: configured entities)
        entities: Vec<String>,
        /// Number of builds
        #[arg(short, long, default_value_t = 100)]
        runs: usize,
        /// Seed for the random source
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create global config template
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}
