//! Shared fixtures for pipeline integration tests.

use anyhow::Result;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use superact::correlate::{ParserOutput, ResultParser};
use superact::engine::WorkflowEngine;
use superact::pipeline::PipelineInputs;
use tempfile::TempDir;

/// Serializes tests that touch process-global environment variables
/// (`GITHUB_OUTPUT` in particular).
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Engine stand-in: records the invocation, optionally drops a raw
/// results artifact next to the document the way the collection step
/// would, and exits with a fixed code.
pub struct FakeEngine {
    pub invoked: Cell<bool>,
    pub exit_code: i32,
    pub raw_results: Option<String>,
}

impl FakeEngine {
    pub fn succeeding(raw_results: &str) -> Self {
        Self {
            invoked: Cell::new(false),
            exit_code: 0,
            raw_results: Some(raw_results.to_string()),
        }
    }

    pub fn failing_with(exit_code: i32, raw_results: Option<&str>) -> Self {
        Self {
            invoked: Cell::new(false),
            exit_code,
            raw_results: raw_results.map(str::to_string),
        }
    }
}

impl WorkflowEngine for FakeEngine {
    fn execute(&self, document: &Path, _runner_os: &str, _workspace: &Path) -> Result<i32> {
        self.invoked.set(true);
        assert!(document.is_file(), "engine launched without a document");
        if let Some(raw) = &self.raw_results {
            let results_path = document.with_file_name("results.json");
            fs::write(results_path, raw)?;
        }
        Ok(self.exit_code)
    }
}

/// Parser stand-in that checks its three inputs exist and replies with a
/// fixed stdout.
pub struct FakeParser {
    pub stdout: String,
    pub exit_code: i32,
}

impl FakeParser {
    pub fn replying(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            exit_code: 0,
        }
    }
}

impl ResultParser for FakeParser {
    fn correlate(&self, results: &Path, map: &Path, steps: &Path) -> Result<ParserOutput> {
        for path in [results, map, steps] {
            assert!(path.is_file(), "parser invoked with missing {}", path.display());
        }
        Ok(ParserOutput {
            exit_code: Some(self.exit_code),
            stdout: self.stdout.clone(),
            stderr: String::new(),
        })
    }
}

/// Workspace plus pipeline inputs for a custom step list.
pub fn inputs_for(action_list: &str, workspace: &TempDir) -> PipelineInputs {
    PipelineInputs {
        presets_yaml: None,
        action_list_yaml: Some(action_list.to_string()),
        runner_os: "ubuntu-latest".to_string(),
        results_output_file: None,
        display_results: false,
        workspace: workspace.path().to_path_buf(),
        presets_dir: workspace.path().join("presets"),
    }
}

pub fn write_preset(presets_dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(presets_dir).unwrap();
    fs::write(presets_dir.join(format!("{name}.json")), contents).unwrap();
}

pub fn run_dir() -> TempDir {
    TempDir::new().unwrap()
}

pub fn run_paths(dir: &TempDir) -> superact::paths::RunPaths {
    superact::paths::RunPaths::new(dir.path())
}

/// Point `GITHUB_OUTPUT` at a fresh file and return its path. Callers
/// must hold [`env_lock`].
pub fn capture_output_channel(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("github_output");
    std::env::set_var("GITHUB_OUTPUT", &path);
    path
}
