use anyhow::{Context, Result};
use serde_json::json;

use nbrun_core::Notebook;

/// Load and validate a notebook, then print a summary without running it.
pub fn show_command(notebook_path: &str, as_json: bool) -> Result<()> {
    let notebook = Notebook::from_path(notebook_path)
        .with_context(|| format!("failed to load {notebook_path}"))?;

    let kernel = notebook
        .metadata
        .get("kernelspec")
        .and_then(|spec| spec.get("name"))
        .and_then(|name| name.as_str());

    if as_json {
        let summary = json!({
            "path": notebook_path,
            "nbformat": notebook.nbformat,
            "nbformat_minor": notebook.nbformat_minor,
            "cells": notebook.cell_count(),
            "code_cells": notebook.code_cell_count(),
            "kernel": kernel,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{notebook_path}");
        println!(
            "  format:     {}.{}",
            notebook.nbformat, notebook.nbformat_minor
        );
        println!(
            "  cells:      {} ({} code)",
            notebook.cell_count(),
            notebook.code_cell_count()
        );
        println!("  kernel:     {}", kernel.unwrap_or("(not declared)"));
    }

    Ok(())
}
