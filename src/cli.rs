use clap::{Parser, Subcommand};
use mediahint_common::{Category, SearchField};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediahint")]
#[command(author, version, about = "Media title and creator suggestion lookup")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one term into suggestions
    Lookup {
        /// Media category (film, anime, music, book)
        #[arg(required = true)]
        category: Category,

        /// Text typed into the searched field
        #[arg(required = true)]
        term: String,

        /// Which field the term was typed into (title or creator)
        #[arg(short, long, default_value = "title")]
        field: SearchField,

        /// Value of the other field, used to filter results
        #[arg(short, long, default_value = "")]
        with: String,

        /// Maximum number of suggestions (defaults to the profile's limit)
        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// Lookup profile to use (create, edit, now_playing, ...)
        #[arg(short, long)]
        profile: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read successive field values from stdin and print debounced suggestions
    Interactive {
        /// Media category (film, anime, music, book)
        #[arg(required = true)]
        category: Category,

        /// Which field stdin lines are typed into (title or creator)
        #[arg(short, long, default_value = "title")]
        field: SearchField,

        /// Lookup profile to use
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
