//! Build-time configuration.
//!
//! Configuration is passed explicitly into every component that needs it;
//! there is no process-wide singleton. The on-disk format is a small YAML
//! file:
//!
//! ```yaml
//! redhat: true
//! repositories:
//!   extras: https://example.com/extras.repo
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::KilnError;

/// Reserved catalog key carrying metadata about the catalog itself; never a
/// repository entry.
pub const RESERVED_NAME_KEY: &str = "__name__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Gates content-set generation and passes `--redhat` to the broker.
    #[serde(default)]
    pub redhat: bool,

    /// Catalog of known package repositories, name to URL. Used to resolve
    /// the deprecated bare-name repository form.
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,
}

impl BuildConfig {
    /// Load configuration from a path. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, KilnError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default location when none is
    /// given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, KilnError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("kiln").join("config.yaml"))
    }

    /// Look up a catalog URL by repository name.
    pub fn repository_url(&self, name: &str) -> Option<&str> {
        if name == RESERVED_NAME_KEY {
            return None;
        }
        self.repositories.get(name).map(String::as_str)
    }

    /// Names available in the catalog, with the reserved metadata key
    /// removed.
    pub fn repository_names(&self) -> Vec<&str> {
        self.repositories
            .keys()
            .map(String::as_str)
            .filter(|name| *name != RESERVED_NAME_KEY)
            .collect()
    }
}
