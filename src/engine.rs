//! Workflow engine invocation.

use crate::annotation;
use crate::document::JOB_NAME;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;

const ENGINE_COMMAND_ENV: &str = "SUPERACT_ENGINE_COMMAND";
const DEFAULT_ENGINE_COMMAND: &str = "act";
/// Pinned so containerized runs are reproducible across host machines.
const CONTAINER_ARCH: &str = "linux/amd64";

/// Capability boundary around the external workflow engine.
///
/// The engine consumes a workflow document and produces the raw results
/// artifact as a side effect. The exit status is reported, never
/// interpreted: a non-zero status downgrades the pipeline to best-effort
/// instead of aborting it.
pub trait WorkflowEngine {
    fn execute(&self, document: &Path, runner_os: &str, workspace: &Path) -> Result<i32>;
}

/// `act`-backed engine. The base command line can be overridden through
/// `SUPERACT_ENGINE_COMMAND` (shell-words syntax).
pub struct ActEngine {
    argv: Vec<String>,
}

impl ActEngine {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(anyhow!("engine command is empty"));
        }
        Ok(Self { argv })
    }

    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(ENGINE_COMMAND_ENV)
            .unwrap_or_else(|_| DEFAULT_ENGINE_COMMAND.to_string());
        let argv = shell_words::split(&raw)
            .with_context(|| format!("parse {ENGINE_COMMAND_ENV}: {raw}"))?;
        let engine = Self::new(argv)?;
        which::which(&engine.argv[0])
            .with_context(|| format!("engine binary {:?} not found", engine.argv[0]))?;
        Ok(engine)
    }
}

impl WorkflowEngine for ActEngine {
    fn execute(&self, document: &Path, runner_os: &str, workspace: &Path) -> Result<i32> {
        let mut argv = self.argv.clone();
        argv.extend([
            "push".to_string(),
            "-P".to_string(),
            format!("{runner_os}=-self-hosted"),
            "--workflows".to_string(),
            document.display().to_string(),
            "--job".to_string(),
            JOB_NAME.to_string(),
            "--bind".to_string(),
            "--directory".to_string(),
            workspace.display().to_string(),
            "--container-architecture".to_string(),
            CONTAINER_ARCH.to_string(),
        ]);
        tracing::debug!(command = %shell_words::join(&argv), "executing engine");

        annotation::group("Running act...");
        let program = argv.remove(0);
        // Inherited stdio: engine output streams live for however long the
        // workflow runs; nothing is buffered here.
        let status = Command::new(program)
            .args(argv)
            .status()
            .context("execute workflow engine");
        annotation::end_group();

        Ok(status?.code().unwrap_or(-1))
    }
}
