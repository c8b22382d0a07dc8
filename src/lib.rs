//! kiln - build container images from declarative descriptors.
//!
//! kiln turns a YAML image descriptor into a buildable artifact set: it
//! validates package-repository declarations, resolves the configured
//! repository catalog, drives the ODCS broker to materialize content sets
//! for RPM based builds, and copies declared artifacts into the build
//! context.

pub mod checksum;
pub mod cli;
pub mod command_runner;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod output;
pub mod platform;
pub mod resource;

pub use cli::{Cli, Commands};
pub use error::KilnError;
