//! Descriptor types for kiln.
//!
//! A descriptor is the validated, schema-checked declarative structure
//! describing part of an image build. Raw `*Spec` types mirror the YAML
//! shape; validated entities are built from them during descriptor load.

pub mod artifact;
pub mod image;
pub mod packages;
pub mod repository;

pub use artifact::{Artifact, ArtifactSource, ArtifactSpec};
pub use image::{Image, ImageSpec};
pub use packages::{ContentSets, Packages, PackagesSpec};
pub use repository::{
    OdcsSource, Repository, RepositoryEntry, RepositorySource, RepositorySpec, RepositoryUrl,
};
