//! CLI argument parsing for the dynamic workflow pipeline.
//!
//! Every flag can also arrive as the corresponding environment variable,
//! mirroring the hosting action's input surface, so the binary works both
//! as an action entrypoint and from a shell.

use clap::Parser;
use std::path::PathBuf;

/// Default catalog directory for curated presets.
pub const DEFAULT_PRESETS_DIR: &str = "/presets";
/// Default target platform label for the generated job.
pub const DEFAULT_RUNNER_OS: &str = "ubuntu-latest";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "superact",
    version,
    about = "Assemble heterogeneous steps into one dynamic workflow, run it through act, and correlate per-step results"
)]
pub struct RootArgs {
    /// YAML sequence of preset names, included before custom steps
    #[arg(long, env = "INPUT_PRESETS", value_name = "YAML")]
    pub presets: Option<String>,

    /// YAML sequence of custom step mappings (uses/run form)
    #[arg(long, env = "INPUT_ACTION_LIST", value_name = "YAML")]
    pub action_list: Option<String>,

    /// Target runner platform label for the generated job
    #[arg(long, env = "INPUT_RUNNER_OS", value_name = "LABEL")]
    pub runner_os: Option<String>,

    /// Relative path under the workspace to save the results JSON
    #[arg(long, env = "INPUT_RESULTS_OUTPUT_FILE", value_name = "PATH")]
    pub results_output_file: Option<String>,

    /// Pretty-print the collected results to the log (true/false)
    #[arg(long, env = "INPUT_DISPLAY_RESULTS", value_name = "BOOL")]
    pub display_results: Option<String>,

    /// Workspace root bound into the engine container
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".", value_name = "DIR")]
    pub workspace: PathBuf,

    /// Directory holding the preset catalog files
    #[arg(
        long,
        env = "SUPERACT_PRESETS_DIR",
        default_value = DEFAULT_PRESETS_DIR,
        value_name = "DIR"
    )]
    pub presets_dir: PathBuf,
}

impl RootArgs {
    /// Effective runner platform; empty env values fall back to the
    /// default rather than producing an empty label.
    pub fn effective_runner_os(&self) -> String {
        self.runner_os
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_RUNNER_OS)
            .to_string()
    }

    /// Effective display toggle; anything other than a case-insensitive
    /// `false` keeps the default of displaying results.
    pub fn effective_display_results(&self) -> bool {
        self.display_results
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| !value.eq_ignore_ascii_case("false"))
            .unwrap_or(true)
    }
}
