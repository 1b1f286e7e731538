//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Risk taxonomy engine: hierarchical identifiers, weighted score rollups, and audit trails
#[derive(Parser, Debug)]
#[command(name = "rstax")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recompute hierarchical identifiers for a taxonomy file
    Assign {
        /// Taxonomy JSON file (array of nodes)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rewrite the input file in place
        #[arg(long, conflicts_with = "output")]
        in_place: bool,
    },

    /// Render the taxonomy hierarchy with identifiers
    Tree {
        /// Taxonomy JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Weighted rollup of leaf scores up the taxonomy
    Score {
        /// Taxonomy JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// JSON file mapping node id to leaf score
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        scores: PathBuf,
    },

    /// Audit diff of two entity snapshot files
    Diff {
        /// "before" snapshot (omit for a create)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        before: Option<PathBuf>,

        /// "after" snapshot (omit for a delete)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        after: Option<PathBuf>,

        /// Entity type (risk, process, control, ...)
        #[arg(short = 't', long, default_value = "risk")]
        entity_type: String,

        /// Stable entity id
        #[arg(long)]
        entity_id: String,

        /// Display name captured on the entry
        #[arg(long)]
        entity_name: String,

        /// Actor recorded on the entry (default from settings)
        #[arg(long)]
        actor: Option<String>,

        /// Emit the entry as JSON instead of a colored report
        #[arg(long)]
        json: bool,

        /// Append the entry to the audit log file
        #[arg(long)]
        log: bool,
    },

    /// Show entries from an audit log file
    Log {
        /// Audit log file (JSON lines; default from settings)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        /// Only entries for this entity id
        #[arg(long)]
        entity: Option<String>,

        /// Only entries of this entity type
        #[arg(short = 't', long)]
        entity_type: Option<String>,
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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Write a template config file
    Init {
        /// Target path (default: global config location)
        path: Option<PathBuf>,
    },
}
