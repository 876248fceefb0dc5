//! CLI commands and argument parsing

use crate::projection::FieldProjection;
use crate::types::PageOrder;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fetch complete GitHub star collections
#[derive(Parser, Debug)]
#[command(name = "starfetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Preference file (JSON)
    #[arg(long, global = true)]
    pub prefs: Option<PathBuf>,

    /// Cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Access token (defaults to GITHUB_TOKEN, then the stored token)
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every stargazer of a repository
    Stargazers {
        /// Repository as owner/name
        repo: String,

        /// Download options
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// List every project starred by a user
    Starred {
        /// User login
        user: String,

        /// Download options
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Inspect or toggle result caching
    Cache {
        /// Cache action
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the stored access token
    Token {
        /// Token action
        #[command(subcommand)]
        action: TokenAction,
    },
}

/// Options shared by the download commands
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Keep only these fields (comma-separated)
    #[arg(long, value_parser = parse_fields)]
    pub fields: Option<FieldProjection>,

    /// Abort when the collection spans more pages than this
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Order of the printed records
    #[arg(long)]
    pub page_order: Option<OrderArg>,
}

fn parse_fields(list: &str) -> Result<FieldProjection, String> {
    FieldProjection::parse(list).ok_or_else(|| "expected at least one field name".to_string())
}

/// Cache subcommands
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CacheAction {
    /// Show whether caching is supported and enabled
    Status,
    /// Turn caching on
    Enable,
    /// Turn caching off
    Disable,
}

/// Token subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TokenAction {
    /// Store a token
    Set {
        /// Token value
        value: String,
    },
    /// Remove the stored token
    Clear,
    /// Show the stored token, masked
    Show,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

/// Collection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OrderArg {
    /// Pages in the order they arrived
    Completion,
    /// Pages sorted by page number
    PageNumber,
}

impl From<OrderArg> for PageOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Completion => PageOrder::Completion,
            OrderArg::PageNumber => PageOrder::PageNumber,
        }
    }
}
