// packbuild/src/cli/resolve.rs
use clap::Args;
use colored::Colorize;
use packbuild_common::error::{PackbuildError, Result};
use packbuild_common::manifest::{FormatSpec, Manifest};
use packbuild_common::model::DeploymentMode;
use packbuild_common::Config;
use packbuild_core::{resolve_dependencies, FormatResolver, ProjectContext};
use packbuild_net::build_http_client;
use tracing::info;

#[derive(Args, Debug)]
pub struct ResolveArgs {}

impl ResolveArgs {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let manifest = Manifest::load(&config.manifest_file())?;
        let kind = manifest.project.pack_kind;

        let (version_name, format_code) = match &manifest.project.pack_format {
            FormatSpec::Code(code) => (None, *code),
            FormatSpec::VersionName(name) => {
                let mut resolver = FormatResolver::new(config, build_http_client()?)?;
                let code = resolver.resolve(name, kind).await?;
                (Some(name.clone()), code)
            }
        };

        if format_code < kind.min_format() {
            return Err(PackbuildError::ValidationError(format!(
                "Pack format {format_code} is below {}, the first format {} packs exist for",
                kind.min_format(),
                kind
            )));
        }

        info!(
            "Project '{}' v{}: {} pack, format {}",
            manifest.project.name, manifest.project.version, kind, format_code
        );

        let project = ProjectContext {
            pack_kind: kind,
            version_name,
            format_code: Some(format_code),
        };
        let outcome = resolve_dependencies(config, &project, &manifest.dependencies).await?;

        if !outcome.is_success() {
            for (name, error) in &outcome.failures {
                eprintln!("  {} {name}: {error:#}", "✗".red().bold());
            }
            return Err(PackbuildError::Generic(format!(
                "{} of {} dependencies could not be acquired",
                outcome.failures.len(),
                manifest.dependencies.len()
            )));
        }

        if outcome.ready.is_empty() {
            println!("{}", "No dependencies configured".yellow());
            return Ok(());
        }
        for ready in &outcome.ready {
            let deployment = match ready.deployment {
                DeploymentMode::None => String::new(),
                mode => format!(" [{mode:?}]").to_lowercase(),
            };
            println!(
                "  {} {}{} -> {}",
                "✓".green().bold(),
                ready.name.bold(),
                deployment,
                ready.path.display()
            );
        }
        Ok(())
    }
}
