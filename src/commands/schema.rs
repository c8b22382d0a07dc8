//! JSON schema generation for the descriptor types.

use anyhow::{Context, Result};
use clap::Args;
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

use crate::descriptor::{ArtifactSpec, ImageSpec, PackagesSpec, RepositorySpec};

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Output directory (if not specified, prints to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn generate_all_schemas() -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (
            "image.schema.json",
            serde_json::to_string_pretty(&schema_for!(ImageSpec))?,
        ),
        (
            "packages.schema.json",
            serde_json::to_string_pretty(&schema_for!(PackagesSpec))?,
        ),
        (
            "repository.schema.json",
            serde_json::to_string_pretty(&schema_for!(RepositorySpec))?,
        ),
        (
            "artifact.schema.json",
            serde_json::to_string_pretty(&schema_for!(ArtifactSpec))?,
        ),
    ])
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let schemas = generate_all_schemas()?;

    match args.output {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
            for (filename, json) in schemas {
                let path = dir.join(filename);
                fs::write(&path, &json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
        None => {
            let mut combined: serde_json::Map<String, serde_json::Value> = serde_json::Map::new();
            for (filename, json) in schemas {
                let value: serde_json::Value = serde_json::from_str(&json)?;
                let name = filename.strip_suffix(".schema.json").unwrap_or(filename);
                combined.insert(name.to_string(), value);
            }
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
    }

    Ok(())
}
