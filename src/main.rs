use anyhow::{Context, Result};
use clap::Parser;
use superact::annotation;
use superact::cli::RootArgs;
use superact::correlate::ProcessParser;
use superact::engine::ActEngine;
use superact::paths::RunPaths;
use superact::pipeline::{self, PipelineInputs};

fn main() {
    init_tracing();
    let args = RootArgs::parse();
    if let Err(err) = run(args) {
        annotation::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(args: RootArgs) -> Result<()> {
    let inputs = PipelineInputs {
        presets_yaml: args.presets.clone(),
        action_list_yaml: args.action_list.clone(),
        runner_os: args.effective_runner_os(),
        results_output_file: args.results_output_file.clone(),
        display_results: args.effective_display_results(),
        workspace: args.workspace.clone(),
        presets_dir: args.presets_dir.clone(),
    };

    let engine = ActEngine::from_env()?;
    let parser = ProcessParser::from_env()?;

    // Run-scoped scratch directory: all intermediate artifacts live and
    // die with this invocation.
    let run_dir = tempfile::Builder::new()
        .prefix("superact-")
        .tempdir()
        .context("create run directory")?;
    let paths = RunPaths::new(run_dir.path());

    let outcome = pipeline::run(&inputs, &engine, &parser, &paths)?;
    tracing::debug!(
        engine_exit_code = outcome.engine_exit_code,
        degraded = outcome.degraded,
        "pipeline finished"
    );
    Ok(())
}

fn init_tracing() {
    let default_level = if std::env::var("RUNNER_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
