//! Build-context generation: content sets, repositories, artifacts.
//!
//! The generator is the driver that turns a validated [`Image`] into files
//! under the build target directory. Everything runs synchronously, in
//! declaration order; the first failure aborts the build step and partial
//! output is left on disk.

pub mod odcs;

use std::path::PathBuf;
use tracing::{debug, info};

use crate::command_runner::CommandRunner;
use crate::config::BuildConfig;
use crate::descriptor::{ContentSets, Image, Packages, RepositorySource};
use crate::error::KilnError;
use crate::generator::odcs::OdcsClient;
use crate::platform::Arch;
use crate::resource::ResourceFetcher;

/// What generation produced, for the caller to report or feed downstream.
#[derive(Debug, Default)]
pub struct BuildOutputs {
    /// URL of the broker-generated repo file, when content sets applied.
    pub content_set_repofile: Option<String>,
    /// Repository files fetched into the build context.
    pub repo_files: Vec<PathBuf>,
    /// Artifacts copied into the build context.
    pub artifacts: Vec<PathBuf>,
}

/// Drives package-repository and artifact preparation for one image.
pub struct Generator<'a> {
    target: PathBuf,
    config: &'a BuildConfig,
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn ResourceFetcher,
}

impl<'a> Generator<'a> {
    pub fn new(
        target: impl Into<PathBuf>,
        config: &'a BuildConfig,
        runner: &'a dyn CommandRunner,
        fetcher: &'a dyn ResourceFetcher,
    ) -> Self {
        Self {
            target: target.into(),
            config,
            runner,
            fetcher,
        }
    }

    /// Run the full preparation pipeline for an image.
    pub fn generate(&self, image: &Image) -> Result<BuildOutputs, KilnError> {
        let content_set_repofile = self.prepare_content_sets(image.packages())?;
        if let Some(url) = &content_set_repofile {
            info!("content set repo file available at '{}'", url);
        }
        let repo_files = self.prepare_repositories(image.packages())?;
        let artifacts = self.prepare_artifacts(image)?;
        Ok(BuildOutputs {
            content_set_repofile,
            repo_files,
            artifacts,
        })
    }

    /// Ask the broker for a platform-specific repo file.
    ///
    /// Inapplicable (`None`) outside Red Hat builds and for images that
    /// declare no content sets. An image that declares content sets but has
    /// no entry for the current architecture is a configuration error.
    pub fn prepare_content_sets(&self, packages: &Packages) -> Result<Option<String>, KilnError> {
        if !self.config.redhat {
            return Ok(None);
        }
        let content_sets = match packages.content_sets() {
            Some(content_sets) => content_sets,
            None => return Ok(None),
        };

        let arch = Arch::current();
        let names = self.names_for_arch(content_sets, &arch)?;

        let client = OdcsClient::new(self.runner, self.config.redhat);
        client.create_pulp_compose(names).map(Some)
    }

    fn names_for_arch<'c>(
        &self,
        content_sets: &'c ContentSets,
        arch: &Arch,
    ) -> Result<&'c [String], KilnError> {
        content_sets
            .get(arch.as_str())
            .map(Vec::as_slice)
            .ok_or_else(|| {
                KilnError::Configuration(format!(
                    "there are no content_sets defined for platform '{}'",
                    arch.as_str()
                ))
            })
    }

    /// Fetch every URL-kind repository into the build context.
    ///
    /// Id-, rpm- and odcs-kind repositories are resolved downstream by the
    /// package manager or the broker; repositories marked not present are
    /// skipped entirely.
    pub fn prepare_repositories(&self, packages: &Packages) -> Result<Vec<PathBuf>, KilnError> {
        let repos_dir = self.repos_dir();
        let mut fetched = Vec::new();

        for repo in packages.repositories() {
            if !repo.present() {
                debug!("skipping absent repository '{}'", repo.name());
                continue;
            }
            match repo.source() {
                RepositorySource::Url(_) => {
                    fetched.push(repo.fetch(self.fetcher, &repos_dir)?);
                }
                _ => {
                    debug!(
                        "repository '{}' is resolved downstream, nothing to fetch",
                        repo.name()
                    );
                }
            }
        }

        Ok(fetched)
    }

    /// Copy declared artifacts into the build context.
    ///
    /// Sequential, in declaration order; the first failure aborts
    /// preparation and propagates.
    pub fn prepare_artifacts(&self, image: &Image) -> Result<Vec<PathBuf>, KilnError> {
        let artifacts = image.all_artifacts();
        if artifacts.is_empty() {
            debug!("no artifacts to fetch");
            return Ok(Vec::new());
        }

        info!("handling artifacts");
        let target_dir = self.image_dir();
        let mut copied = Vec::new();
        for artifact in artifacts {
            copied.push(artifact.copy(self.fetcher, &target_dir)?);
        }
        debug!("artifacts handled");
        Ok(copied)
    }

    /// Build-context directory artifacts land in.
    pub fn image_dir(&self) -> PathBuf {
        self.target.join("image")
    }

    /// Build-context directory repository files land in.
    pub fn repos_dir(&self) -> PathBuf {
        self.image_dir().join("repos")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_runner::MockCommandRunner;
    use crate::descriptor::ImageSpec;
    use std::path::Path;

    struct NullFetcher;

    impl ResourceFetcher for NullFetcher {
        fn download(&self, _url: &str) -> Result<Vec<u8>, KilnError> {
            Ok(Vec::new())
        }
    }

    fn image_with_content_sets(arch_key: &str) -> Image {
        let yaml = format!(
            "name: app\npackages:\n  content_sets:\n    {arch_key}:\n      - repoA\n      - repoB\n"
        );
        let spec: ImageSpec = serde_yaml::from_str(&yaml).unwrap();
        Image::from_spec(spec, Path::new("."), &BuildConfig::default()).unwrap()
    }

    #[test]
    fn content_sets_inapplicable_without_redhat_mode() {
        let config = BuildConfig::default();
        let runner = MockCommandRunner::new();
        let generator = Generator::new("target", &config, &runner, &NullFetcher);

        let image = image_with_content_sets(Arch::current().as_str());
        let result = generator
            .prepare_content_sets(image.packages())
            .unwrap();
        assert!(result.is_none());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn missing_arch_fails_without_invoking_broker() {
        let config = BuildConfig {
            redhat: true,
            ..Default::default()
        };
        let runner = MockCommandRunner::new();
        let generator = Generator::new("target", &config, &runner, &NullFetcher);

        let image = image_with_content_sets("kiln-test-noarch");
        let err = generator
            .prepare_content_sets(image.packages())
            .unwrap_err();
        assert!(matches!(err, KilnError::Configuration(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn content_sets_drive_broker_for_current_arch() {
        let config = BuildConfig {
            redhat: true,
            ..Default::default()
        };
        let runner = MockCommandRunner::new();
        runner.push_success(
            "Waiting for command create on compose 7 to finish.\n\
             {'state': 2, 'result_repofile': u'http://x/y.repo'}\n",
        );
        let generator = Generator::new("target", &config, &runner, &NullFetcher);

        let image = image_with_content_sets(Arch::current().as_str());
        let url = generator
            .prepare_content_sets(image.packages())
            .unwrap();
        assert_eq!(url.as_deref(), Some("http://x/y.repo"));

        let calls = runner.calls();
        assert_eq!(calls[0].1, vec!["--redhat", "create", "pulp", "repoA repoB"]);
    }
}
