//! Caller-visible output sinks: the runner output channel, the log
//! display group, and the optional saved results file.

use crate::annotation;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path};

const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";
const OUTPUT_DELIMITER: &str = "EOF";

/// Append a name/value record to the runner output channel.
///
/// Values are framed with the heredoc delimiter protocol so multi-line
/// JSON survives the single-line key/value file format. A missing channel
/// is a warning, not a failure.
pub fn set_output(name: &str, value: &str) {
    let Ok(path) = std::env::var(OUTPUT_FILE_ENV) else {
        annotation::warning(&format!(
            "{OUTPUT_FILE_ENV} environment variable not set; cannot set action output"
        ));
        return;
    };
    if let Err(err) = append_output(Path::new(&path), name, value) {
        annotation::warning(&format!("failed to write to output file {path}: {err:#}"));
    }
}

fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    writeln!(file, "{name}<<{OUTPUT_DELIMITER}\n{value}\n{OUTPUT_DELIMITER}")
        .context("append output record")?;
    Ok(())
}

/// Pretty-print the results array inside a log group when enabled. Raw
/// text is printed verbatim if it does not parse; display never fails the
/// run.
pub fn display_results(results_json: &str, enabled: bool) {
    if !enabled {
        tracing::debug!("result display disabled by the display_results input");
        return;
    }
    annotation::group("Collected results (JSON)");
    let pretty = serde_json::from_str::<serde_json::Value>(results_json)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok());
    match pretty {
        Some(text) => println!("{text}"),
        None => println!("{results_json}"),
    }
    annotation::end_group();
}

/// Save the results under the workspace root.
///
/// Absolute paths and parent traversal are rejected with an error
/// annotation and the save is skipped; the run itself continues.
pub fn save_results(results_json: &str, rel_path: &str, workspace: &Path) {
    let candidate = Path::new(rel_path);
    if candidate.is_absolute() || has_parent_components(candidate) {
        annotation::error(
            "'results_output_file' must be a relative path within the workspace and cannot contain '..'",
        );
        return;
    }
    let target = workspace.join(candidate);
    tracing::debug!(path = %target.display(), "saving results");
    if let Err(err) = write_results(&target, results_json) {
        annotation::warning(&format!(
            "failed to save results to {}: {err:#}",
            target.display()
        ));
        return;
    }
    println!("Results saved to {rel_path}");
}

fn write_results(target: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(target, contents).with_context(|| format!("write {}", target.display()))
}

fn has_parent_components(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_records_use_heredoc_framing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");
        append_output(&path, "results", "[1,\n2]").unwrap();
        append_output(&path, "other", "x").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "results<<EOF\n[1,\n2]\nEOF\nother<<EOF\nx\nEOF\n");
    }

    #[test]
    fn save_rejects_traversal_and_absolute_paths() {
        let dir = TempDir::new().unwrap();
        save_results("[]", "../escape.json", dir.path());
        save_results("[]", "/etc/escape.json", dir.path());
        assert!(!dir.path().join("../escape.json").exists());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        save_results("[42]", "nested/out/results.json", dir.path());
        let written = fs::read_to_string(dir.path().join("nested/out/results.json")).unwrap();
        assert_eq!(written, "[42]");
    }
}
