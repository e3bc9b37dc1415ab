//! Result correlation through the external parser, with a local validity
//! gate.
//!
//! The engine's raw artifact is not contractually well-formed JSON, so the
//! parser process is trusted to repair and remap it — and its own output
//! is then re-validated here before anything reaches the caller. Every
//! failure mode collapses to the stable `[]` fallback.

use crate::annotation;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;

const PARSER_COMMAND_ENV: &str = "SUPERACT_PARSER_COMMAND";
const DEFAULT_PARSER_COMMAND: &str = "python3 /usr/local/bin/parse_results.py";

/// Contractually stable fallback for every correlation failure mode.
pub const EMPTY_RESULTS: &str = "[]";

/// Captured output of one parser invocation.
#[derive(Debug)]
pub struct ParserOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Capability boundary around the external result parser: consumes the
/// raw results artifact, the correlation map, and the merged step list,
/// and emits the ordered results array on stdout.
pub trait ResultParser {
    fn correlate(&self, results: &Path, map: &Path, steps: &Path) -> Result<ParserOutput>;
}

/// Subprocess-backed parser, overridable through `SUPERACT_PARSER_COMMAND`
/// (shell-words syntax).
pub struct ProcessParser {
    argv: Vec<String>,
}

impl ProcessParser {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(anyhow!("parser command is empty"));
        }
        Ok(Self { argv })
    }

    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(PARSER_COMMAND_ENV)
            .unwrap_or_else(|_| DEFAULT_PARSER_COMMAND.to_string());
        let argv = shell_words::split(&raw)
            .with_context(|| format!("parse {PARSER_COMMAND_ENV}: {raw}"))?;
        Self::new(argv)
    }
}

impl ResultParser for ProcessParser {
    fn correlate(&self, results: &Path, map: &Path, steps: &Path) -> Result<ParserOutput> {
        let mut argv = self.argv.clone();
        argv.extend([
            results.display().to_string(),
            map.display().to_string(),
            steps.display().to_string(),
        ]);
        let program = argv.remove(0);
        // Fully buffered: the output is validated as a whole before use.
        let output = Command::new(program)
            .args(argv)
            .output()
            .context("run result parser")?;
        Ok(ParserOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Reconstruct the ordered results array for the caller.
///
/// Never fails: any missing input, parser failure, or invalid candidate
/// JSON degrades to [`EMPTY_RESULTS`] with a diagnostic.
pub fn collect_results(
    parser: &dyn ResultParser,
    results: &Path,
    map: &Path,
    steps: &Path,
) -> String {
    let mut missing = false;
    for (label, path) in [
        ("raw results", results),
        ("id-index map", map),
        ("merged steps", steps),
    ] {
        if !path.is_file() {
            annotation::warning(&format!("missing {label} file: {}", path.display()));
            missing = true;
        }
    }
    if missing {
        annotation::warning(
            "one or more required files for results processing not found; setting empty results",
        );
        return EMPTY_RESULTS.to_string();
    }

    tracing::debug!("processing results through the external parser");
    let output = match parser.correlate(results, map, steps) {
        Ok(output) => output,
        Err(err) => {
            annotation::error(&format!("error running result parser: {err:#}"));
            return EMPTY_RESULTS.to_string();
        }
    };

    if output.exit_code != Some(0) {
        annotation::error(&format!(
            "result parser failed with exit code {}",
            output.exit_code.unwrap_or(-1)
        ));
        eprintln!("parser stdout:\n{}", output.stdout);
        eprintln!("parser stderr:\n{}", output.stderr);
        return EMPTY_RESULTS.to_string();
    }
    if !output.stderr.trim().is_empty() {
        tracing::debug!(stderr = %output.stderr.trim(), "parser diagnostics");
    }

    let candidate = output.stdout.trim().to_string();
    match serde_json::from_str::<serde_json::Value>(&candidate) {
        Ok(_) => candidate,
        Err(err) => {
            annotation::error(&format!(
                "correlated results JSON is invalid ({err}); falling back to empty array"
            ));
            eprintln!("invalid JSON received: {candidate}");
            EMPTY_RESULTS.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct FixedParser {
        exit_code: Option<i32>,
        stdout: String,
    }

    impl ResultParser for FixedParser {
        fn correlate(&self, _: &Path, _: &Path, _: &Path) -> Result<ParserOutput> {
            Ok(ParserOutput {
                exit_code: self.exit_code,
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    fn existing_inputs(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
        let results = dir.path().join("results.json");
        let map = dir.path().join("map.json");
        let steps = dir.path().join("steps.yaml");
        fs::write(&results, "{}").unwrap();
        fs::write(&map, "{}").unwrap();
        fs::write(&steps, "[]").unwrap();
        (results, map, steps)
    }

    #[test]
    fn valid_parser_output_passes_through() {
        let dir = TempDir::new().unwrap();
        let (results, map, steps) = existing_inputs(&dir);
        let parser = FixedParser {
            exit_code: Some(0),
            stdout: "[{\"index\":0,\"status\":\"success\"}]\n".to_string(),
        };
        let collected = collect_results(&parser, &results, &map, &steps);
        assert_eq!(collected, "[{\"index\":0,\"status\":\"success\"}]");
    }

    #[test]
    fn invalid_parser_output_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        let (results, map, steps) = existing_inputs(&dir);
        let parser = FixedParser {
            exit_code: Some(0),
            stdout: "{not valid json".to_string(),
        };
        assert_eq!(collect_results(&parser, &results, &map, &steps), EMPTY_RESULTS);
    }

    #[test]
    fn parser_failure_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        let (results, map, steps) = existing_inputs(&dir);
        let parser = FixedParser {
            exit_code: Some(3),
            stdout: "[]".to_string(),
        };
        assert_eq!(collect_results(&parser, &results, &map, &steps), EMPTY_RESULTS);
    }

    #[test]
    fn any_missing_input_short_circuits_to_empty() {
        let dir = TempDir::new().unwrap();
        let (results, map, steps) = existing_inputs(&dir);
        let parser = FixedParser {
            exit_code: Some(0),
            stdout: "[1]".to_string(),
        };
        for victim in [&results, &map, &steps] {
            fs::remove_file(victim).unwrap();
            assert_eq!(collect_results(&parser, &results, &map, &steps), EMPTY_RESULTS);
            fs::write(victim, "{}").unwrap();
        }
        // All present again: the parser result flows through.
        assert_eq!(collect_results(&parser, &results, &map, &steps), "[1]");
    }

    #[cfg(unix)]
    #[test]
    fn process_parser_captures_stdout_and_exit_code() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = dir.path().join("parse.sh");
        fs::write(&script, "#!/bin/sh\necho '[]'\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let parser = ProcessParser::new(vec![script.display().to_string()]).unwrap();
        let (results, map, steps) = existing_inputs(&dir);
        let output = parser.correlate(&results, &map, &steps).unwrap();
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout.trim(), "[]");
    }
}
