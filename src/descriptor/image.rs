//! Top-level image descriptor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::BuildConfig;
use crate::descriptor::artifact::{Artifact, ArtifactSpec};
use crate::descriptor::packages::{Packages, PackagesSpec};
use crate::error::KilnError;

/// Raw descriptor shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ImageSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Base image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<PackagesSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactSpec>,
}

/// Validated image descriptor.
#[derive(Debug, Clone)]
pub struct Image {
    name: String,
    version: Option<String>,
    from: Option<String>,
    packages: Packages,
    artifacts: Vec<Artifact>,
}

impl Image {
    /// Load and validate an image descriptor from a YAML file. Relative
    /// paths inside the descriptor resolve against its containing directory.
    pub fn load(path: &Path, config: &BuildConfig) -> Result<Self, KilnError> {
        if !path.exists() {
            return Err(KilnError::Configuration(format!(
                "'{}' descriptor not found",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let spec: ImageSpec = serde_yaml::from_str(&content)?;
        let descriptor_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_spec(spec, descriptor_dir, config)
    }

    pub fn from_spec(
        spec: ImageSpec,
        descriptor_dir: &Path,
        config: &BuildConfig,
    ) -> Result<Self, KilnError> {
        if spec.name.is_empty() {
            return Err(KilnError::Validation(
                "image descriptor requires a name".to_string(),
            ));
        }

        let packages =
            Packages::from_spec(spec.packages.unwrap_or_default(), descriptor_dir, config)?;
        let artifacts = spec
            .artifacts
            .into_iter()
            .map(|artifact| Artifact::from_spec(artifact, descriptor_dir))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: spec.name,
            version: spec.version,
            from: spec.from,
            packages,
            artifacts,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Base image reference, when the descriptor declares one.
    pub fn base(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn packages(&self) -> &Packages {
        &self.packages
    }

    /// Artifacts declared by the image, in declaration order.
    pub fn all_artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }
}
