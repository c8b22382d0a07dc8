//! Abstraction over external command execution for testability.
//!
//! All shelled-out tool invocations (the ODCS broker client in particular) go
//! through the [`CommandRunner`] trait. [`RealCommandRunner`] delegates to
//! [`std::process::Command`]; [`MockCommandRunner`] returns scripted
//! responses and records every call, enabling fast, deterministic tests
//! without spawning subprocesses.

use std::collections::VecDeque;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::sync::Mutex;

/// Trait for abstracting external command execution.
///
/// Commands run synchronously to completion with their full output captured;
/// there is no timeout, so a hang in the external tool blocks the build.
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its full output (stdout + stderr + exit
    /// status). A spawn failure (e.g. executable not on PATH) surfaces as the
    /// underlying [`io::Error`] so callers can map it precisely.
    fn run_output(&self, program: &str, args: &[&str]) -> io::Result<Output>;
}

/// Production implementation that delegates to [`std::process::Command`].
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run_output(&self, program: &str, args: &[&str]) -> io::Result<Output> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
    }
}

/// Scripted runner for tests.
///
/// Responses are returned in push order; every invocation is recorded and can
/// be inspected with [`MockCommandRunner::calls`]. Running past the end of
/// the script panics, which in a test is the right failure mode.
#[derive(Default)]
pub struct MockCommandRunner {
    responses: Mutex<VecDeque<io::Result<Output>>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful run with the given stdout.
    pub fn push_success(&self, stdout: &str) {
        self.push_exit(0, stdout, "");
    }

    /// Script a completed run with an explicit exit code.
    pub fn push_exit(&self, code: i32, stdout: &str, stderr: &str) {
        self.responses.lock().unwrap().push_back(Ok(Output {
            status: exit_status(code),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }));
    }

    /// Script a spawn failure (the program could not be executed at all).
    pub fn push_spawn_error(&self, kind: io::ErrorKind) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(io::Error::new(kind, "scripted spawn failure")));
    }

    /// Every `(program, args)` pair run so far, in call order.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run_output(&self, program: &str, args: &[&str]) -> io::Result<Output> {
        self.calls.lock().unwrap().push((
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockCommandRunner ran out of scripted responses")
    }
}

fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}
