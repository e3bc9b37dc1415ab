//! Step specification model, merge, and synthetic id assignment.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Raw step mapping as authored in a preset file or the caller's step
/// list. Unknown keys are tolerated; the exactly-one-of `uses`/`run`
/// check happens when converting into [`StepSpec`].
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct RawStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    #[serde(
        default,
        rename = "working-directory",
        skip_serializing_if = "Option::is_none"
    )]
    pub working_directory: Option<String>,
}

/// One caller-requested unit of work, validated at parse time: either a
/// reference to a reusable action or an inline script, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSpec {
    Uses {
        uses: String,
        name: Option<String>,
        with: Option<Mapping>,
    },
    Run {
        run: String,
        name: Option<String>,
        shell: Option<String>,
        working_directory: Option<String>,
    },
}

impl StepSpec {
    /// Apply the exactly-one-of invariant. Empty strings count as absent,
    /// matching how authors leave keys blank in YAML.
    pub fn from_raw(raw: RawStep) -> Result<Self> {
        let uses = raw.uses.filter(|value| !value.trim().is_empty());
        let run = raw.run.filter(|value| !value.trim().is_empty());
        match (uses, run) {
            (Some(uses), None) => Ok(Self::Uses {
                uses,
                name: raw.name,
                with: raw.with,
            }),
            (None, Some(run)) => Ok(Self::Run {
                run,
                name: raw.name,
                shell: raw.shell,
                working_directory: raw.working_directory,
            }),
            (Some(_), Some(_)) => Err(anyhow!(
                "invalid step definition: 'uses' and 'run' are mutually exclusive"
            )),
            (None, None) => Err(anyhow!(
                "invalid step definition: must contain 'uses' or 'run'"
            )),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Uses { name, .. } | Self::Run { name, .. } => name.as_deref(),
        }
    }
}

impl From<&StepSpec> for RawStep {
    fn from(spec: &StepSpec) -> Self {
        match spec {
            StepSpec::Uses { uses, name, with } => Self {
                uses: Some(uses.clone()),
                name: name.clone(),
                with: with.clone(),
                ..Self::default()
            },
            StepSpec::Run {
                run,
                name,
                shell,
                working_directory,
            } => Self {
                run: Some(run.clone()),
                name: name.clone(),
                shell: shell.clone(),
                working_directory: working_directory.clone(),
                ..Self::default()
            },
        }
    }
}

/// A step ready for inclusion in the generated workflow document.
///
/// The synthetic `id` embeds the step's merged-list position, which makes
/// ids collision-free across the whole list without any dedup pass.
#[derive(Debug, Clone)]
pub struct CanonicalStep {
    pub index: usize,
    pub id: String,
    pub display_name: String,
    pub spec: StepSpec,
}

/// Concatenate preset steps and custom steps (presets first, order
/// preserved exactly) and assign each a synthetic id and display name.
pub fn merge_steps(presets: Vec<StepSpec>, custom: Vec<StepSpec>) -> Result<Vec<CanonicalStep>> {
    let merged: Vec<StepSpec> = presets.into_iter().chain(custom).collect();
    if merged.is_empty() {
        return Err(anyhow!(
            "no steps found after processing presets and action_list"
        ));
    }
    Ok(merged
        .into_iter()
        .enumerate()
        .map(|(index, spec)| canonicalize(index, spec))
        .collect())
}

fn canonicalize(index: usize, spec: StepSpec) -> CanonicalStep {
    let (id, fallback_name) = match &spec {
        StepSpec::Uses { uses, .. } => (
            format!("action_{index}_{}", action_token(uses)),
            format!("Run {uses}"),
        ),
        StepSpec::Run { .. } => (format!("action_{index}_run"), format!("Run script {index}")),
    };
    let display_name = spec
        .name()
        .map(collapse_whitespace)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback_name);
    CanonicalStep {
        index,
        id,
        display_name,
        spec,
    }
}

/// Derive the id token from an action reference: version suffix stripped,
/// path separators flattened.
fn action_token(uses: &str) -> String {
    let base = uses.split('@').next().unwrap_or(uses);
    base.replace('/', "-")
}

fn collapse_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
