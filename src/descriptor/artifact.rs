//! Image artifacts copied into the build context.
//!
//! An artifact comes from exactly one place: a URL fetched over HTTP, or a
//! local path resolved relative to the descriptor. A declared sha256 is
//! verified before the artifact lands in the build context.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum;
use crate::error::KilnError;
use crate::resource::ResourceFetcher;

/// Raw descriptor shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactSpec {
    /// Destination file name; defaults to the last segment of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Where an artifact is retrieved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    Url(String),
    /// Resolved against the descriptor directory at construction time.
    Path(PathBuf),
}

/// Validated artifact entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    name: String,
    source: ArtifactSource,
    sha256: Option<String>,
}

impl Artifact {
    pub fn from_spec(spec: ArtifactSpec, descriptor_dir: &Path) -> Result<Self, KilnError> {
        let label = spec.name.clone().unwrap_or_else(|| "<unnamed>".to_string());

        let source = match (spec.url, spec.path) {
            (Some(url), None) => ArtifactSource::Url(url),
            (None, Some(path)) => ArtifactSource::Path(descriptor_dir.join(path)),
            _ => {
                return Err(KilnError::Validation(format!(
                    "artifact '{}' is invalid, you can use only one of ['path', 'url']",
                    label
                )))
            }
        };

        let name = match spec.name {
            Some(name) => name,
            None => default_name(&source)?,
        };

        Ok(Self {
            name,
            source,
            sha256: spec.sha256,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    /// Copy the artifact into `target_dir`, verifying its checksum when one
    /// is declared. Returns the destination path.
    pub fn copy(
        &self,
        fetcher: &dyn ResourceFetcher,
        target_dir: &Path,
    ) -> Result<PathBuf, KilnError> {
        let bytes = match &self.source {
            ArtifactSource::Url(url) => fetcher.download(url)?,
            ArtifactSource::Path(path) => fs::read(path)?,
        };

        if let Some(expected) = &self.sha256 {
            let actual = checksum::sha256_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(KilnError::Validation(format!(
                    "sha256 mismatch for '{}': expected {}, got {}",
                    self.name, expected, actual
                )));
            }
        }

        fs::create_dir_all(target_dir)?;
        let dest = target_dir.join(&self.name);
        fs::write(&dest, bytes)?;
        Ok(dest)
    }
}

fn default_name(source: &ArtifactSource) -> Result<String, KilnError> {
    let candidate = match source {
        ArtifactSource::Url(url) => url.rsplit('/').next().unwrap_or(""),
        ArtifactSource::Path(path) => path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
    };
    if candidate.is_empty() {
        return Err(KilnError::Validation(
            "cannot derive an artifact name, specify one explicitly".to_string(),
        ));
    }
    Ok(candidate.to_string())
}
