// packbuild/src/cli/clean.rs
use clap::Args;
use colored::Colorize;
use packbuild_common::error::Result;
use packbuild_common::{CacheLayout, Config};

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Cache subtree to clean; all subtrees when omitted
    pub name: Option<String>,
}

impl CleanArgs {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let cache = CacheLayout::new(config)?;
        match &self.name {
            Some(name) => {
                cache.clean(name)?;
                println!("{} cache subtree '{name}'", "Cleaned".green().bold());
            }
            None => {
                cache.clean_all()?;
                println!("{} all cache subtrees", "Cleaned".green().bold());
            }
        }
        Ok(())
    }
}
