// packbuild/src/main.rs
use std::process;
use std::{env, fs};

use clap::Parser;
use colored::Colorize;
use packbuild_common::error::{PackbuildError, Result};
use packbuild_common::Config;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let level_filter = match cli_args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("PACKBUILD_LOG")
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();

    let config = match load_config(&cli_args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = cli_args.command.run(&config).await {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }

    debug!("Command completed successfully.");
    Ok(())
}

/// The project root is the only ambient input; everything downstream works
/// off the explicit `Config` value.
fn load_config(cli_args: &CliArgs) -> Result<Config> {
    let project_root = match &cli_args.project_root {
        Some(root) => root.clone(),
        None => env::current_dir().map_err(|e| {
            PackbuildError::Config(format!("Unable to determine the working directory: {e}"))
        })?,
    };
    let project_root = fs::canonicalize(&project_root).map_err(|e| {
        PackbuildError::Config(format!(
            "Project root '{}' is not accessible: {e}",
            project_root.display()
        ))
    })?;
    Ok(Config::new(project_root))
}
