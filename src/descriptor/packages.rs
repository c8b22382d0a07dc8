//! The `packages` section of an image descriptor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::BuildConfig;
use crate::descriptor::repository::{Repository, RepositoryEntry};
use crate::error::KilnError;

/// Content sets keyed by RPM architecture name.
pub type ContentSets = BTreeMap<String, Vec<String>>;

/// Raw descriptor shape. `content_sets` and `content_sets_file` are an
/// input-only union: at most one may appear, and the file variant is consumed
/// during resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PackagesSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_sets: Option<ContentSets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_sets_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepositoryEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install: Vec<String>,
}

/// Validated package-management section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packages {
    repositories: Vec<Repository>,
    install: Vec<String>,
    content_sets: Option<ContentSets>,
}

impl Packages {
    /// Resolve a raw `packages` section. `descriptor_dir` anchors the
    /// `content_sets_file` path.
    pub fn from_spec(
        spec: PackagesSpec,
        descriptor_dir: &Path,
        config: &BuildConfig,
    ) -> Result<Self, KilnError> {
        if spec.content_sets.is_some() && spec.content_sets_file.is_some() {
            return Err(KilnError::Validation(
                "you cannot specify content_sets and content_sets_file together".to_string(),
            ));
        }

        let content_sets = match spec.content_sets_file {
            Some(file) => Some(load_content_sets(&descriptor_dir.join(file))?),
            None => spec.content_sets,
        };

        let repositories = spec
            .repositories
            .into_iter()
            .map(|entry| Repository::from_entry(entry, config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            repositories,
            install: spec.install,
            content_sets,
        })
    }

    /// Declared repositories, in declaration order. Order is significant for
    /// install-time precedence.
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Packages to install, in declaration order.
    pub fn install(&self) -> &[String] {
        &self.install
    }

    pub fn content_sets(&self) -> Option<&ContentSets> {
        self.content_sets.as_ref()
    }

    /// Replace the content sets. The file variant of the input union no
    /// longer exists after construction, so there is nothing else to clear.
    pub fn set_content_sets(&mut self, content_sets: ContentSets) {
        self.content_sets = Some(content_sets);
    }

    /// Merge an overlay section into this one.
    ///
    /// Repositories are upserted by name with replace-only source semantics;
    /// install lists concatenate without duplicates, preserving order;
    /// content sets overlay per architecture.
    pub fn merged(&self, overlay: &Packages) -> Packages {
        let mut repositories = self.repositories.clone();
        for repo in &overlay.repositories {
            if let Some(existing) = repositories.iter_mut().find(|r| r.name() == repo.name()) {
                *existing = existing.merged(repo);
            } else {
                repositories.push(repo.clone());
            }
        }

        let mut install = self.install.clone();
        for pkg in &overlay.install {
            if !install.contains(pkg) {
                install.push(pkg.clone());
            }
        }

        let content_sets = match (&self.content_sets, &overlay.content_sets) {
            (Some(base), Some(over)) => {
                let mut merged = base.clone();
                for (arch, names) in over {
                    merged.insert(arch.clone(), names.clone());
                }
                Some(merged)
            }
            (base, over) => over.clone().or_else(|| base.clone()),
        };

        Packages {
            repositories,
            install,
            content_sets,
        }
    }
}

/// Load an external content-sets file. The file is consumed into the
/// canonical `content_sets` form and never retained as a path.
fn load_content_sets(path: &Path) -> Result<ContentSets, KilnError> {
    if !path.exists() {
        return Err(KilnError::Configuration(format!(
            "'{}' file not found",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    let content_sets = serde_yaml::from_str(&content)?;
    Ok(content_sets)
}
