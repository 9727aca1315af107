// packbuild/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use packbuild_common::error::Result;
use packbuild_common::Config;

pub mod clean;
pub mod formats;
pub mod resolve;

use crate::cli::clean::CleanArgs;
use crate::cli::formats::FormatsArgs;
use crate::cli::resolve::ResolveArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "packbuild", bin_name = "packbuild")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root directory (defaults to the working directory)
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile and acquire the project's dependencies
    Resolve(ResolveArgs),
    /// Look up the pack format code for a version name
    Formats(FormatsArgs),
    /// Remove cached data
    Clean(CleanArgs),
}

impl Command {
    pub async fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Resolve(command) => command.run(config).await,
            Self::Formats(command) => command.run(config).await,
            Self::Clean(command) => command.run(config).await,
        }
    }
}
