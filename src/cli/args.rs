//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

/// Structural union, intersection, difference and similarity of outline trees
#[derive(Parser, Debug)]
#[command(name = "settree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr, repeat for more (-d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Local config file (default: ./.settree.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Reject duplicate sibling values, overrides the configured policy
    #[arg(short, long, global = true)]
    pub unique: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render an outline as a tree, or list its nodes in traversal order
    Show {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Rendering or traversal order
        #[arg(short, long, value_enum, default_value_t = Order::Tree)]
        order: Order,
    },

    /// Merge two outlines
    Union(PairArgs),

    /// Keep what both outlines share
    Intersect(PairArgs),

    /// Remove from LEFT what RIGHT covers
    Diff(PairArgs),

    /// Similarity score of LEFT against RIGHT
    Similarity {
        #[arg(value_hint = ValueHint::FilePath)]
        left: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        right: PathBuf,
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

/// Two input outlines and an optional output file.
#[derive(Args, Debug)]
pub struct PairArgs {
    /// Left operand
    #[arg(value_hint = ValueHint::FilePath)]
    pub left: PathBuf,

    /// Right operand
    #[arg(value_hint = ValueHint::FilePath)]
    pub right: PathBuf,

    /// Write the result as an outline instead of printing it
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Indented tree drawing
    Tree,
    /// Breadth-first
    Bfs,
    /// Depth-first
    Dfs,
    /// Children before parents
    Post,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
