//! CLI module
//!
//! Command-line interface for downloading collections.
//!
//! # Commands
//!
//! - `stargazers` - Every stargazer of a repository
//! - `starred` - Every project starred by a user
//! - `cache` - Show or toggle result caching
//! - `token` - Manage the stored access token

mod commands;
mod output;
mod runner;

pub use commands::{CacheAction, Cli, Commands, FetchArgs, OrderArg, OutputFormat, TokenAction};
pub use output::{mask_token, render};
pub use runner::{Runner, TOKEN_ENV};
