//! Package repository declarations.
//!
//! A repository resolves through exactly one source kind: a package-manager
//! id, a direct URL, an RPM that ships the repo file, or an ODCS compose.
//! The descriptor form is a mapping; a bare string is the deprecated legacy
//! form, resolved against the configured repository catalog.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::BuildConfig;
use crate::error::KilnError;
use crate::resource::ResourceFetcher;

/// URL source: the repo file itself plus an optional GPG key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RepositoryUrl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpg: Option<String>,
}

/// ODCS source: a pulp content-set compose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OdcsSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulp: Option<String>,
}

/// How a repository is ultimately resolved. Exactly one kind per repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySource {
    /// Enabled by id through the platform package manager.
    Id(String),
    /// Fetched directly into the build context.
    Url(RepositoryUrl),
    /// Installed by an RPM that ships the repo file.
    Rpm(String),
    /// Materialized by the ODCS broker.
    Odcs(OdcsSource),
}

/// Raw descriptor shape, before source-kind selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RepositorySpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<RepositoryUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odcs: Option<OdcsSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// A mapping entry or the deprecated bare-name form.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RepositoryEntry {
    Name(String),
    Spec(RepositorySpec),
}

/// Validated repository entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    name: String,
    description: Option<String>,
    present: bool,
    source: RepositorySource,
    filename: Option<String>,
}

impl Repository {
    /// Build a repository from a descriptor entry. Bare names go through the
    /// deprecated catalog lookup.
    pub fn from_entry(entry: RepositoryEntry, config: &BuildConfig) -> Result<Self, KilnError> {
        let spec = match entry {
            RepositoryEntry::Name(name) => legacy_spec(name, config),
            RepositoryEntry::Spec(spec) => spec,
        };
        Self::from_spec(spec)
    }

    /// Validate a raw mapping into an entity, selecting exactly one source
    /// kind.
    pub fn from_spec(spec: RepositorySpec) -> Result<Self, KilnError> {
        let RepositorySpec {
            name,
            id,
            present,
            url,
            rpm,
            description,
            odcs,
            filename,
        } = spec;

        if name.is_empty() {
            return Err(KilnError::Validation(
                "repository without a name".to_string(),
            ));
        }

        let source = match (id, url, rpm, odcs) {
            (Some(id), None, None, None) => RepositorySource::Id(id),
            (None, Some(url), None, None) => RepositorySource::Url(url),
            (None, None, Some(rpm), None) => RepositorySource::Rpm(rpm),
            (None, None, None, Some(odcs)) => RepositorySource::Odcs(odcs),
            _ => {
                return Err(KilnError::Validation(format!(
                    "repository '{}' is invalid, you can use only one of ['id', 'odcs', 'rpm', 'url']",
                    name
                )))
            }
        };

        Ok(Self {
            name,
            description,
            present: present.unwrap_or(true),
            source,
            filename,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn present(&self) -> bool {
        self.present
    }

    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    pub fn source(&self) -> &RepositorySource {
        &self.source
    }

    /// Replace the source wholesale. The filename is unset and re-derived on
    /// next read.
    pub fn set_source(&mut self, source: RepositorySource) {
        self.source = source;
        self.filename = None;
    }

    /// Repo file name in the build context; derived from the repository name
    /// unless explicitly set.
    pub fn filename(&self) -> String {
        match &self.filename {
            Some(filename) => filename.clone(),
            None => format!("{}.repo", self.name.replace(' ', "_")),
        }
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = Some(filename.into());
    }

    /// Combine with an overlay declaration of the same repository.
    ///
    /// Scalar fields merge field-wise with the overlay winning; the source
    /// and filename are replace-only, taken wholesale from the overlay and
    /// never combined across kinds.
    pub fn merged(&self, overlay: &Repository) -> Repository {
        Repository {
            name: self.name.clone(),
            description: overlay
                .description
                .clone()
                .or_else(|| self.description.clone()),
            present: overlay.present,
            source: overlay.source.clone(),
            filename: overlay.filename.clone(),
        }
    }

    /// Materialize a URL-kind repository into `target_dir`.
    ///
    /// Id-, rpm- and odcs-kind repositories are resolved by downstream
    /// tooling and cannot be fetched directly; a URL-kind repository with no
    /// resolvable URL (a failed legacy catalog lookup) fails here, at its
    /// point of use.
    pub fn fetch(
        &self,
        fetcher: &dyn ResourceFetcher,
        target_dir: &Path,
    ) -> Result<PathBuf, KilnError> {
        let url = match &self.source {
            RepositorySource::Url(url) => url.repository.as_deref(),
            _ => None,
        };
        let url = url.filter(|u| !u.is_empty()).ok_or_else(|| {
            KilnError::Configuration(format!("repository not defined for '{}'", self.name))
        })?;

        fs::create_dir_all(target_dir)?;
        let dest = target_dir.join(self.filename());
        let bytes = fetcher.download(url)?;
        fs::write(&dest, bytes)?;
        Ok(dest)
    }
}

/// Resolve the deprecated bare-name form against the configured catalog.
///
/// The bare form itself is deprecated, so this always warns. A name missing
/// from the catalog is degraded, not fatal: the entity carries an empty URL
/// and fails at fetch time if actually used.
fn legacy_spec(name: String, config: &BuildConfig) -> RepositorySpec {
    warn!(
        "The way of defining repository '{}' is deprecated, convert it to an URL based repository object",
        name
    );

    let repository = match config.repository_url(&name) {
        Some(url) => Some(url.to_string()),
        None => {
            let available = config.repository_names();
            if available.is_empty() {
                warn!(
                    "Package repository '{}' used in descriptor is not available in kiln configuration",
                    name
                );
            } else {
                warn!(
                    "Package repository '{}' used in descriptor is not available in kiln configuration, available repositories: {}",
                    name,
                    available.join(" ")
                );
            }
            None
        }
    };

    RepositorySpec {
        name,
        url: Some(RepositoryUrl {
            repository,
            gpg: None,
        }),
        ..Default::default()
    }
}
