use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "marknote")]
#[command(version, about = "Markdown notes with live preview, stored locally")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project root (defaults to the nearest directory containing .marknote/)
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new marknote project in the current directory
    Init,

    /// Create a note
    New {
        /// Note title
        title: String,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes, most recently modified first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a note
    Show {
        /// Note ID or unique ID prefix
        id: String,

        /// Output as JSON
        #[arg(long, conflicts_with = "html")]
        json: bool,

        /// Print the rendered HTML preview
        #[arg(long)]
        html: bool,
    },

    /// Change a note's title or content
    Edit {
        /// Note ID or unique ID prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// Read new content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show the information panel
    Info,
}
