//! `kiln generate` implementation.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::command_runner::RealCommandRunner;
use crate::config::BuildConfig;
use crate::descriptor::Image;
use crate::generator::Generator;
use crate::output::Output;
use crate::resource::HttpFetcher;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Path to the image descriptor
    pub descriptor: PathBuf,

    /// Build target directory
    #[arg(long, default_value = "target")]
    pub target: PathBuf,

    /// Path to the kiln configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable the Red Hat build mode (content sets, --redhat broker flag)
    #[arg(long)]
    pub redhat: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let mut config = BuildConfig::load_or_default(args.config.as_deref())
        .context("failed to load kiln configuration")?;
    if args.redhat {
        config.redhat = true;
    }

    let image = Image::load(&args.descriptor, &config)
        .with_context(|| format!("failed to load descriptor {}", args.descriptor.display()))?;

    let runner = RealCommandRunner;
    let fetcher = HttpFetcher;
    let generator = Generator::new(args.target, &config, &runner, &fetcher);
    let outputs = generator.generate(&image)?;

    if let Some(url) = &outputs.content_set_repofile {
        Output::info(format!("content set repo file: {url}"));
    }
    Output::success(format!(
        "prepared {} repository file(s) and {} artifact(s) for '{}'",
        outputs.repo_files.len(),
        outputs.artifacts.len(),
        image.name()
    ));
    Ok(())
}
