//! Workflow command annotations understood by the hosting runner.
//!
//! These lines are a wire protocol on stderr: the runner surfaces
//! `::error::` and `::warning::` in its UI and folds `::group::` blocks.
//! Diagnostic logging goes through `tracing` instead.

/// Emit an error annotation.
pub fn error(message: &str) {
    eprintln!("::error::{message}");
}

/// Emit a warning annotation.
pub fn warning(message: &str) {
    eprintln!("::warning::{message}");
}

/// Open a collapsible log group.
pub fn group(title: &str) {
    eprintln!("::group::{title}");
}

/// Close the innermost log group.
pub fn end_group() {
    eprintln!("::endgroup::");
}
