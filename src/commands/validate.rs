//! `kiln validate` implementation.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::descriptor::{Image, RepositorySource};
use crate::output::Output;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the image descriptor
    pub descriptor: PathBuf,

    /// Path to the kiln configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = BuildConfig::load_or_default(args.config.as_deref())
        .context("failed to load kiln configuration")?;
    let image = Image::load(&args.descriptor, &config)
        .with_context(|| format!("failed to load descriptor {}", args.descriptor.display()))?;

    let packages = image.packages();
    for repo in packages.repositories() {
        if let RepositorySource::Url(url) = repo.source() {
            if url.repository.is_none() {
                Output::warning(format!(
                    "repository '{}' has no resolvable URL and will fail at fetch time",
                    repo.name()
                ));
            }
        }
    }

    Output::success(format!(
        "descriptor '{}' is valid: {} repositories, {} packages to install, {} artifacts",
        image.name(),
        packages.repositories().len(),
        packages.install().len(),
        image.all_artifacts().len()
    ));
    Ok(())
}
