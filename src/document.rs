//! Workflow document generation and the id→index correlation map.

use crate::step::{CanonicalStep, StepSpec};
use serde::Serialize;
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::path::Path;

/// The single job every generated document carries.
pub const JOB_NAME: &str = "dynamic_job";
/// Id of the appended terminal step that dumps the engine's step state.
pub const COLLECT_STEP_ID: &str = "collect_results_step";

const WORKFLOW_NAME: &str = "Dynamic Workflow Execution";
const DEFAULT_SHELL: &str = "bash";

/// Synthetic id → original merged-list index. Internal to one run; the
/// caller only ever sees results re-ordered through it.
pub type CorrelationMap = BTreeMap<String, usize>;

/// The runnable artifact handed to the engine.
#[derive(Serialize, Debug)]
pub struct WorkflowDocument {
    name: String,
    // The engine refuses documents without an event trigger.
    on: Trigger,
    jobs: Jobs,
}

#[derive(Serialize, Debug)]
struct Trigger {
    push: (),
}

#[derive(Serialize, Debug)]
struct Jobs {
    dynamic_job: Job,
}

#[derive(Serialize, Debug)]
struct Job {
    #[serde(rename = "runs-on")]
    runs_on: String,
    steps: Vec<StepEntry>,
}

/// One rendered step. Only the fields for the step's form are emitted.
#[derive(Serialize, Debug)]
pub struct StepEntry {
    name: String,
    id: String,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    with: Option<Mapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shell: Option<String>,
    #[serde(rename = "working-directory", skip_serializing_if = "Option::is_none")]
    working_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<String>,
}

impl WorkflowDocument {
    pub fn step_count(&self) -> usize {
        self.jobs.dynamic_job.steps.len()
    }
}

/// Render the canonical steps into a workflow document and build the
/// correlation map in the same pass.
///
/// Each step's rendered name is `"<display_name> (<id>)"`: the id rides in
/// the human-visible name as a second correlation channel that survives
/// loss of the map file.
pub fn build_document(
    steps: &[CanonicalStep],
    runner_os: &str,
    results_path: &Path,
) -> (WorkflowDocument, CorrelationMap) {
    let mut map = CorrelationMap::new();
    let mut entries = Vec::with_capacity(steps.len() + 1);

    for step in steps {
        map.insert(step.id.clone(), step.index);
        entries.push(render_step(step));
    }
    entries.push(collect_results_entry(results_path));

    let document = WorkflowDocument {
        name: WORKFLOW_NAME.to_string(),
        on: Trigger { push: () },
        jobs: Jobs {
            dynamic_job: Job {
                runs_on: runner_os.to_string(),
                steps: entries,
            },
        },
    };
    (document, map)
}

fn render_step(step: &CanonicalStep) -> StepEntry {
    let mut entry = StepEntry {
        name: format!("{} ({})", step.display_name, step.id),
        id: step.id.clone(),
        condition: None,
        uses: None,
        with: None,
        shell: None,
        working_directory: None,
        run: None,
    };
    match &step.spec {
        StepSpec::Uses { uses, with, .. } => {
            entry.uses = Some(uses.clone());
            entry.with = with.clone();
        }
        StepSpec::Run {
            run,
            shell,
            working_directory,
            ..
        } => {
            entry.shell = Some(shell.clone().unwrap_or_else(|| DEFAULT_SHELL.to_string()));
            entry.working_directory = working_directory.clone();
            entry.run = Some(run.clone());
        }
    }
    entry
}

/// Terminal step that serializes the engine's internal per-step state to
/// the results artifact. Runs regardless of prior step failures so partial
/// runs still leave results behind.
fn collect_results_entry(results_path: &Path) -> StepEntry {
    let results = results_path.display();
    let body = [
        format!("echo 'Writing raw results to {results}...' >&2"),
        // The dump may not be strict JSON; the downstream parser tolerates that.
        format!("printf '%s\\n' \"${{{{ toJSON(steps) }}}}\" > \"{results}\""),
        "echo 'Raw results written.' >&2".to_string(),
    ]
    .join("\n");

    StepEntry {
        name: "Collect Results".to_string(),
        id: COLLECT_STEP_ID.to_string(),
        condition: Some("always()".to_string()),
        uses: None,
        with: None,
        shell: Some(DEFAULT_SHELL.to_string()),
        working_directory: None,
        run: Some(body),
    }
}
