use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::catalog::{MovieId, TitleLanguage};
use crate::export::IdKind;

#[derive(Debug, Parser)]
#[command(
    name = "letterlog",
    version,
    about = "Search TMDb, collect rated picks, and export a Letterboxd CSV"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file (defaults to <config dir>/letterlog/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "TMDB_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, value_enum, global = true)]
    pub lang: Option<TitleLanguage>,

    #[arg(long, value_enum, global = true)]
    pub id_kind: Option<IdKind>,

    #[arg(long, global = true)]
    pub no_title: bool,

    #[arg(long, global = true)]
    pub no_year: bool,

    /// Include the Rating10 column
    #[arg(long, global = true)]
    pub rating: bool,

    /// Include the Review column
    #[arg(long, global = true)]
    pub review: bool,

    /// Log HTTP and store activity to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every match for a query, most popular first
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show the detail view for one movie
    Show { id: MovieId },
    /// Fetch a picks file and write the export CSV
    Export {
        /// CSV with `id[,rating][,review]` rows
        #[arg(long)]
        picks: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Interactive line-oriented session (default)
    Session,
}
