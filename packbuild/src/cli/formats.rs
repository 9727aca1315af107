// packbuild/src/cli/formats.rs
use clap::{Args, ValueEnum};
use colored::Colorize;
use packbuild_common::error::Result;
use packbuild_common::model::PackKind;
use packbuild_common::Config;
use packbuild_core::FormatResolver;
use packbuild_net::build_http_client;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Data,
    Resource,
}

impl From<KindArg> for PackKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Data => PackKind::Data,
            KindArg::Resource => PackKind::Resource,
        }
    }
}

#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Version name to resolve (aliases are understood)
    pub version: String,

    /// Pack kind to resolve the format for
    #[arg(long, value_enum, default_value_t = KindArg::Data)]
    kind: KindArg,
}

impl FormatsArgs {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let mut resolver = FormatResolver::new(config, build_http_client()?)?;
        let kind = PackKind::from(self.kind);
        let code = resolver.resolve(&self.version, kind).await?;
        println!("{} ({} pack): {}", self.version.bold(), kind, code);
        Ok(())
    }
}
