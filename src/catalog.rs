//! Preset catalog and caller step-list loading.
//!
//! Presets are curated step lists shipped as `<name>.json` files in a
//! catalog directory; the caller's own steps arrive as a YAML sequence.
//! Per-preset problems degrade to warnings, but a malformed top-level
//! input or an invalid step spec aborts the run.

use crate::annotation;
use crate::step::{RawStep, StepSpec};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// Resolve requested preset names against the catalog directory and load
/// their steps in request order.
pub fn load_presets(raw_yaml: Option<&str>, presets_dir: &Path) -> Result<Vec<StepSpec>> {
    let Some(raw) = raw_yaml.filter(|value| !value.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let names: Vec<String> = serde_yaml::from_str(raw)
        .map_err(|err| anyhow!("input 'presets' must be a YAML sequence of names: {err}"))?;
    tracing::debug!(count = names.len(), "processing presets");

    let mut specs = Vec::new();
    for name in &names {
        if !is_safe_preset_name(name) {
            annotation::warning(&format!("ignoring preset with unsafe name: {name:?}"));
            continue;
        }
        let preset_file = presets_dir.join(format!("{name}.json"));
        if !preset_file.is_file() {
            annotation::warning(&format!(
                "preset file not found for requested preset: {name} (expected at {})",
                preset_file.display()
            ));
            continue;
        }
        tracing::debug!(preset = %name, path = %preset_file.display(), "loading preset");
        let Some(raw_steps) = read_preset_steps(&preset_file) else {
            continue;
        };
        for raw_step in raw_steps {
            let spec = StepSpec::from_raw(raw_step)
                .with_context(|| format!("preset '{name}'"))?;
            specs.push(spec);
        }
    }
    Ok(specs)
}

/// Parse the caller-declared step list. A top-level structure that is not
/// a sequence is a fatal configuration error.
pub fn load_custom_steps(raw_yaml: Option<&str>) -> Result<Vec<StepSpec>> {
    let Some(raw) = raw_yaml.filter(|value| !value.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let raw_steps: Vec<RawStep> = serde_yaml::from_str(raw).map_err(|err| {
        anyhow!("input 'action_list' must be a YAML sequence of step mappings: {err}")
    })?;
    tracing::debug!(count = raw_steps.len(), "adding custom steps from action_list");

    raw_steps
        .into_iter()
        .enumerate()
        .map(|(index, raw_step)| {
            StepSpec::from_raw(raw_step)
                .with_context(|| format!("action_list step at index {index}"))
        })
        .collect()
}

/// Read one preset file, reporting file-level problems as warnings and
/// returning `None` so the preset is skipped.
fn read_preset_steps(preset_file: &Path) -> Option<Vec<RawStep>> {
    let contents = match fs::read_to_string(preset_file) {
        Ok(contents) => contents,
        Err(err) => {
            annotation::warning(&format!(
                "failed to read preset file {}: {err}",
                preset_file.display()
            ));
            return None;
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(err) => {
            annotation::warning(&format!(
                "failed to decode JSON from preset file {}: {err}",
                preset_file.display()
            ));
            return None;
        }
    };
    if !value.is_array() {
        annotation::warning(&format!(
            "preset file {} does not contain a JSON list",
            preset_file.display()
        ));
        return None;
    }
    match serde_json::from_value(value) {
        Ok(raw_steps) => Some(raw_steps),
        Err(err) => {
            annotation::warning(&format!(
                "failed to decode steps from preset file {}: {err}",
                preset_file.display()
            ));
            None
        }
    }
}

fn is_safe_preset_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
