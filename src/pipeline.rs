//! End-to-end pipeline orchestration.
//!
//! Loader → merger → document builder → engine → correlator → output
//! sinks. Fatal errors propagate out of [`run`]; once the engine has been
//! launched the pipeline only ever degrades, it never aborts.

use crate::annotation;
use crate::catalog;
use crate::correlate::{self, ResultParser};
use crate::document::{self, CorrelationMap, WorkflowDocument};
use crate::engine::WorkflowEngine;
use crate::output;
use crate::paths::RunPaths;
use crate::step::{self, CanonicalStep, RawStep};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the pipeline needs for one invocation.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub presets_yaml: Option<String>,
    pub action_list_yaml: Option<String>,
    pub runner_os: String,
    pub results_output_file: Option<String>,
    pub display_results: bool,
    pub workspace: PathBuf,
    pub presets_dir: PathBuf,
}

/// Completed pipeline state.
///
/// `degraded` records a non-zero engine exit: the run still completed and
/// `results_json` carries whatever could be salvaged (possibly
/// [`correlate::EMPTY_RESULTS`]).
#[derive(Debug)]
pub struct PipelineOutcome {
    pub results_json: String,
    pub engine_exit_code: i32,
    pub degraded: bool,
}

/// Run the whole pipeline against the given engine and parser.
pub fn run(
    inputs: &PipelineInputs,
    engine: &dyn WorkflowEngine,
    parser: &dyn ResultParser,
    paths: &RunPaths,
) -> Result<PipelineOutcome> {
    let has_presets = non_empty(inputs.presets_yaml.as_deref());
    let has_custom = non_empty(inputs.action_list_yaml.as_deref());
    if !has_presets && !has_custom {
        return Err(anyhow!(
            "at least one of 'presets' or 'action_list' inputs must be provided"
        ));
    }

    let presets = catalog::load_presets(inputs.presets_yaml.as_deref(), &inputs.presets_dir)?;
    let custom = catalog::load_custom_steps(inputs.action_list_yaml.as_deref())?;
    let steps = step::merge_steps(presets, custom)?;
    tracing::debug!(count = steps.len(), "merged steps");

    write_merged_steps(&steps, &paths.merged_steps_path())?;
    let (workflow, map) = document::build_document(&steps, &inputs.runner_os, &paths.results_path());
    write_document(&workflow, &paths.document_path())?;
    write_map(&map, &paths.map_path())?;

    let engine_exit_code =
        engine.execute(&paths.document_path(), &inputs.runner_os, &inputs.workspace)?;
    let degraded = engine_exit_code != 0;
    if degraded {
        annotation::warning(&format!(
            "workflow engine exited with code {engine_exit_code}; attempting to process results anyway"
        ));
    }

    let results_json = correlate::collect_results(
        parser,
        &paths.results_path(),
        &paths.map_path(),
        &paths.merged_steps_path(),
    );

    output::set_output("results", &results_json);
    output::display_results(&results_json, inputs.display_results);
    if let Some(rel_path) = inputs
        .results_output_file
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        output::save_results(&results_json, rel_path, &inputs.workspace);
    }

    Ok(PipelineOutcome {
        results_json,
        engine_exit_code,
        degraded,
    })
}

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

fn write_merged_steps(steps: &[CanonicalStep], path: &Path) -> Result<()> {
    let records: Vec<RawStep> = steps.iter().map(|step| RawStep::from(&step.spec)).collect();
    let yaml = serde_yaml::to_string(&records).context("serialize merged steps")?;
    fs::write(path, yaml).with_context(|| format!("write merged steps {}", path.display()))
}

fn write_document(workflow: &WorkflowDocument, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(workflow).context("serialize workflow document")?;
    fs::write(path, yaml).with_context(|| format!("write workflow document {}", path.display()))
}

fn write_map(map: &CorrelationMap, path: &Path) -> Result<()> {
    let json = serde_json::to_string(map).context("serialize id-index map")?;
    fs::write(path, json).with_context(|| format!("write id-index map {}", path.display()))
}
