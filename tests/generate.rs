//! End-to-end descriptor to build-context tests.
//!
//! These drive the full pipeline with a scripted command runner and fetcher,
//! so no network access and no real broker are involved.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use kiln::command_runner::MockCommandRunner;
use kiln::config::BuildConfig;
use kiln::descriptor::Image;
use kiln::error::KilnError;
use kiln::generator::Generator;
use kiln::platform::Arch;
use kiln::resource::ResourceFetcher;
use tempfile::TempDir;

/// Fetcher with canned per-URL responses; records request order.
#[derive(Default)]
struct ScriptedFetcher {
    responses: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn with(mut self, url: &str, bytes: &[u8]) -> Self {
        self.responses.insert(url.to_string(), bytes.to_vec());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ResourceFetcher for ScriptedFetcher {
    fn download(&self, url: &str) -> Result<Vec<u8>, KilnError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| KilnError::Http(format!("no response scripted for '{url}'")))
    }
}

fn write_descriptor(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("image.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn generate_prepares_repos_and_artifacts() {
    let temp = TempDir::new().unwrap();
    let descriptor = write_descriptor(
        temp.path(),
        concat!(
            "name: example-app\n",
            "packages:\n",
            "  install:\n",
            "    - vim\n",
            "  repositories:\n",
            "    - name: extras\n",
            "      url:\n",
            "        repository: https://example.com/extras.repo\n",
            "    - name: managed\n",
            "      id: rhel-7-server-rpms\n",
            "artifacts:\n",
            "  - url: https://example.com/tool.jar\n",
        ),
    );

    let config = BuildConfig::default();
    let image = Image::load(&descriptor, &config).unwrap();

    let runner = MockCommandRunner::new();
    let fetcher = ScriptedFetcher::default()
        .with("https://example.com/extras.repo", b"[extras]\n")
        .with("https://example.com/tool.jar", b"jar bytes");

    let target = temp.path().join("target");
    let generator = Generator::new(&target, &config, &runner, &fetcher);
    let outputs = generator.generate(&image).unwrap();

    // Not a Red Hat build: the broker never runs.
    assert!(outputs.content_set_repofile.is_none());
    assert!(runner.calls().is_empty());

    // The URL repository lands under image/repos; the id repository is left
    // to downstream tooling.
    assert_eq!(outputs.repo_files.len(), 1);
    let repo_file = target.join("image").join("repos").join("extras.repo");
    assert_eq!(fs::read(&repo_file).unwrap(), b"[extras]\n");

    assert_eq!(outputs.artifacts.len(), 1);
    let artifact = target.join("image").join("tool.jar");
    assert_eq!(fs::read(&artifact).unwrap(), b"jar bytes");
}

#[test]
fn generate_with_content_sets_file_drives_broker() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("content_sets.yaml"),
        format!("{}:\n  - repoA\n  - repoB\n", Arch::current().as_str()),
    )
    .unwrap();
    let descriptor = write_descriptor(
        temp.path(),
        concat!(
            "name: example-app\n",
            "packages:\n",
            "  content_sets_file: content_sets.yaml\n",
        ),
    );

    let config = BuildConfig {
        redhat: true,
        ..Default::default()
    };
    let image = Image::load(&descriptor, &config).unwrap();

    let runner = MockCommandRunner::new();
    runner.push_success(
        "Waiting for command create on compose 42 to finish.\n\
         {'state': 2, 'state_reason': u'Compose is generated successfully', \
         'result_repofile': u'http://x/y.repo'}\n",
    );
    let fetcher = ScriptedFetcher::default();

    let generator = Generator::new(temp.path().join("target"), &config, &runner, &fetcher);
    let outputs = generator.generate(&image).unwrap();

    assert_eq!(outputs.content_set_repofile.as_deref(), Some("http://x/y.repo"));

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "odcs");
    assert_eq!(calls[0].1, vec!["--redhat", "create", "pulp", "repoA repoB"]);
}

#[test]
fn broker_failure_state_aborts_generation() {
    let temp = TempDir::new().unwrap();
    let descriptor = write_descriptor(
        temp.path(),
        &format!(
            "name: example-app\npackages:\n  content_sets:\n    {}:\n      - repoA\n",
            Arch::current().as_str()
        ),
    );

    let config = BuildConfig {
        redhat: true,
        ..Default::default()
    };
    let image = Image::load(&descriptor, &config).unwrap();

    let runner = MockCommandRunner::new();
    runner.push_success("info\n{'state': 4, 'state_reason': u'failed'}\n");
    let fetcher = ScriptedFetcher::default();

    let generator = Generator::new(temp.path().join("target"), &config, &runner, &fetcher);
    let err = generator.generate(&image).unwrap_err();
    assert!(matches!(err, KilnError::ComposeFailed { .. }));
    assert!(err.to_string().contains("failed"));
}

#[test]
fn no_artifacts_means_no_build_context_writes() {
    let temp = TempDir::new().unwrap();
    let descriptor = write_descriptor(temp.path(), "name: bare\n");

    let config = BuildConfig::default();
    let image = Image::load(&descriptor, &config).unwrap();

    let runner = MockCommandRunner::new();
    let fetcher = ScriptedFetcher::default();
    let target = temp.path().join("target");

    let generator = Generator::new(&target, &config, &runner, &fetcher);
    let outputs = generator.generate(&image).unwrap();

    assert!(outputs.artifacts.is_empty());
    assert!(fetcher.requests().is_empty());
    assert!(!target.exists());
}

#[test]
fn artifacts_copy_in_declaration_order_and_first_failure_aborts() {
    let temp = TempDir::new().unwrap();
    let descriptor = write_descriptor(
        temp.path(),
        concat!(
            "name: example-app\n",
            "artifacts:\n",
            "  - url: https://example.com/first.jar\n",
            "  - url: https://example.com/second.jar\n",
            "  - url: https://example.com/third.jar\n",
        ),
    );

    let config = BuildConfig::default();
    let image = Image::load(&descriptor, &config).unwrap();

    let runner = MockCommandRunner::new();
    // Only the first artifact is resolvable; the second download fails.
    let fetcher = ScriptedFetcher::default().with("https://example.com/first.jar", b"one");

    let target = temp.path().join("target");
    let generator = Generator::new(&target, &config, &runner, &fetcher);
    let err = generator.prepare_artifacts(&image).unwrap_err();
    assert!(matches!(err, KilnError::Http(_)));

    assert_eq!(
        fetcher.requests(),
        vec![
            "https://example.com/first.jar".to_string(),
            "https://example.com/second.jar".to_string(),
        ]
    );
    assert!(target.join("image").join("first.jar").exists());
    assert!(!target.join("image").join("second.jar").exists());
    assert!(!target.join("image").join("third.jar").exists());
}

#[test]
fn legacy_repository_resolves_through_config_catalog() {
    let temp = TempDir::new().unwrap();
    let descriptor = write_descriptor(
        temp.path(),
        concat!(
            "name: example-app\n",
            "packages:\n",
            "  repositories:\n",
            "    - myrepo\n",
        ),
    );

    let mut config = BuildConfig::default();
    config
        .repositories
        .insert("myrepo".to_string(), "http://example/repo".to_string());
    let image = Image::load(&descriptor, &config).unwrap();

    let runner = MockCommandRunner::new();
    let fetcher = ScriptedFetcher::default().with("http://example/repo", b"[myrepo]\n");

    let target = temp.path().join("target");
    let generator = Generator::new(&target, &config, &runner, &fetcher);
    let outputs = generator.generate(&image).unwrap();

    assert_eq!(outputs.repo_files.len(), 1);
    assert!(target.join("image").join("repos").join("myrepo.repo").exists());
}

#[test]
fn unresolved_legacy_repository_fails_at_fetch_time() {
    let temp = TempDir::new().unwrap();
    let descriptor = write_descriptor(
        temp.path(),
        concat!(
            "name: example-app\n",
            "packages:\n",
            "  repositories:\n",
            "    - myrepo\n",
        ),
    );

    // Empty catalog: descriptor load succeeds, fetch is the point of use.
    let config = BuildConfig::default();
    let image = Image::load(&descriptor, &config).unwrap();

    let runner = MockCommandRunner::new();
    let fetcher = ScriptedFetcher::default();
    let generator = Generator::new(temp.path().join("target"), &config, &runner, &fetcher);

    let err = generator.generate(&image).unwrap_err();
    assert!(matches!(err, KilnError::Configuration(_)));
    assert!(err.to_string().contains("'myrepo'"));
}
