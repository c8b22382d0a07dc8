//! CLI argument definitions for kiln.
//!
//! Separated from `main.rs` so library code and shell completion generation
//! can reference these types.

use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Debug, Parser)]
#[command(name = "kiln")]
#[command(about = "Build container images from declarative descriptors")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve repositories and prepare the build context for an image
    Generate(commands::generate::GenerateArgs),

    /// Parse and validate an image descriptor
    Validate(commands::validate::ValidateArgs),

    /// Emit JSON schemas for the descriptor types
    Schema(commands::schema::SchemaArgs),
}
