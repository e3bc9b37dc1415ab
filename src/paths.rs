//! Run-scoped artifact paths.
//!
//! Every invocation works inside its own scratch directory. The file names
//! within it are fixed so the hand-off contract with the engine and parser
//! stays stable, while the directory itself is private to one run.

use std::path::{Path, PathBuf};

const MERGED_STEPS_FILE: &str = "merged_actions.yaml";
const DOCUMENT_FILE: &str = "dynamic_workflow.yml";
const MAP_FILE: &str = "id_index_map.json";
const RESULTS_FILE: &str = "results.json";

/// Locations of the intermediate artifacts for a single pipeline run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    root: PathBuf,
}

impl RunPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Merged canonical step list, consumed by the result parser.
    pub fn merged_steps_path(&self) -> PathBuf {
        self.root.join(MERGED_STEPS_FILE)
    }

    /// Generated workflow document, consumed by the engine.
    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENT_FILE)
    }

    /// id→index correlation map, consumed by the result parser.
    pub fn map_path(&self) -> PathBuf {
        self.root.join(MAP_FILE)
    }

    /// Raw per-step state, written by the engine's collection step.
    pub fn results_path(&self) -> PathBuf {
        self.root.join(RESULTS_FILE)
    }
}
