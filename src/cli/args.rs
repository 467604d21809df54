//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Organize flat parent-referencing records (medicine-cabinet kits) into nested tree hierarchies
#[derive(Parser, Debug)]
#[command(name = "kitree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// JSON file holding the flat record list
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Field holding each record's own identifier
    #[arg(long, global = true)]
    pub id_field: Option<String>,

    /// Field holding the parent reference
    #[arg(long, global = true)]
    pub parent_field: Option<String>,

    /// JSON literal marking top-level records ('null', '0', '"root"')
    #[arg(long, global = true)]
    pub root_marker: Option<String>,

    /// Field used for display labels
    #[arg(long, global = true)]
    pub label_field: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the hierarchy as trees
    Tree,

    /// Print nested JSON (records with injected `children` arrays)
    Nest,

    /// List root records
    Roots,

    /// List leaf records
    Leaves,

    /// Print each lineage as `leaf <- ... <- root`
    Branches,

    /// List records dropped from the hierarchy (exit 1 if any)
    Orphans,

    /// Validate the record file: duplicates, cycles, orphans
    Check,

    /// Show forest statistics
    Stats,

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
    /// Show merged config
    Show,

    /// Create config template
    Init,

    /// Show config path
    Path,
}
