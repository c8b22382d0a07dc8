//! ODCS content-set composes.
//!
//! The broker is driven through its CLI (there is no usable client library
//! for it); its report is treated as untrusted text and normalized before
//! parsing.

use serde::Deserialize;
use std::io;
use tracing::debug;

use crate::command_runner::CommandRunner;
use crate::error::KilnError;

/// Broker state enumeration, from the ODCS contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeState {
    Wait,
    Generating,
    Done,
    Removed,
    Failed,
    Unknown(i64),
}

impl From<i64> for ComposeState {
    fn from(value: i64) -> Self {
        match value {
            0 => ComposeState::Wait,
            1 => ComposeState::Generating,
            2 => ComposeState::Done,
            3 => ComposeState::Removed,
            4 => ComposeState::Failed,
            other => ComposeState::Unknown(other),
        }
    }
}

/// Parsed broker report. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeReport {
    pub state: i64,
    #[serde(default)]
    pub state_reason: Option<String>,
    #[serde(default)]
    pub result_repofile: Option<String>,
}

/// Normalize and parse the broker's textual report.
///
/// The first line is informational chatter and is discarded. The remainder
/// is a YAML flow mapping carrying legacy Python-repr quoting artifacts
/// (` u'`, ` u"`) that must be stripped before parsing.
pub fn parse_compose_output(raw: &str) -> Result<ComposeReport, KilnError> {
    let normalized = raw.replace(" u'", " '").replace(" u\"", " \"");
    let body = match normalized.split_once('\n') {
        Some((_first, rest)) => rest,
        None => "",
    };
    serde_yaml::from_str(body)
        .map_err(|e| KilnError::Unexpected(format!("cannot parse ODCS output: {e}")))
}

/// Client for the ODCS CLI.
pub struct OdcsClient<'a> {
    runner: &'a dyn CommandRunner,
    redhat: bool,
}

impl<'a> OdcsClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner, redhat: bool) -> Self {
        Self { runner, redhat }
    }

    /// Request a pulp compose for the given content-set names and return the
    /// URL of the generated repo file.
    ///
    /// The names are passed to the broker as a single space-separated
    /// argument. Only the `done` state is success; everything else fails
    /// with the broker's own reason.
    pub fn create_pulp_compose(&self, names: &[String]) -> Result<String, KilnError> {
        let sets = names.join(" ");
        let mut args: Vec<&str> = Vec::new();
        if self.redhat {
            args.push("--redhat");
        }
        args.extend(["create", "pulp", sets.as_str()]);

        debug!("creating ODCS content set via 'odcs {}'", args.join(" "));

        let output = match self.runner.run_output("odcs", &args) {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(KilnError::ToolNotInstalled {
                    tool: "odcs".to_string(),
                    package: "odcs-client".to_string(),
                });
            }
            Err(err) => {
                return Err(KilnError::Unexpected(format!(
                    "cannot create content set: {err}"
                )))
            }
        };

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(KilnError::ToolFailed {
                command: "odcs".to_string(),
                output: combined.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = parse_compose_output(&stdout)?;

        if ComposeState::from(report.state) != ComposeState::Done {
            return Err(KilnError::ComposeFailed {
                reason: report
                    .state_reason
                    .unwrap_or_else(|| format!("state {}", report.state)),
            });
        }

        report.result_repofile.ok_or_else(|| {
            KilnError::Unexpected("ODCS response did not contain a result repofile".to_string())
        })
    }
}
