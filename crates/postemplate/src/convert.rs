//! Offline one-shot conversion used by `postemplate convert`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use postemplate_core::config::Settings;
use postemplate_core::outputs::download_filename;
use postemplate_core::reference::load_reference_dataset;
use postemplate_core::{generate_template, TransformSummary};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub basis: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub had_unmatched: bool,
    pub summary: TransformSummary,
}

pub fn run(settings: &Settings, request: &ConvertRequest) -> Result<ConvertReport> {
    let pricing = settings.pricing_policy()?;
    let basis_path = request.basis.as_deref().unwrap_or(settings.basis_path.as_path());
    let basis = load_reference_dataset(basis_path)?;

    let workbook = fs::read(&request.input)
        .with_context(|| format!("failed to read workbook {}", request.input.display()))?;
    let generated = generate_template(&workbook, &basis, &pricing)
        .with_context(|| format!("failed to convert {}", request.input.display()))?;

    let output = match &request.output {
        Some(path) => path.clone(),
        None => default_output_path(&request.input),
    };
    fs::write(&output, &generated.csv)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(output = %output.display(), "Wrote POS template");

    Ok(ConvertReport {
        input: request.input.clone(),
        output,
        had_unmatched: generated.had_unmatched,
        summary: generated.summary,
    })
}

/// `<dir of input>/<sanitized input stem>.csv`
pub fn default_output_path(input: &Path) -> PathBuf {
    let uploaded = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(download_filename(&uploaded))
}

pub fn summary_table(report: &ConvertReport) -> Table {
    let summary = &report.summary;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Input".to_string(), report.input.display().to_string()]);
    table.add_row(vec!["Output".to_string(), report.output.display().to_string()]);
    table.add_row(vec!["Imported rows".to_string(), summary.imported_rows.to_string()]);
    table.add_row(vec!["Distinct items".to_string(), summary.distinct_items.to_string()]);
    table.add_row(vec![
        "Duplicates dropped".to_string(),
        summary.duplicates_dropped.to_string(),
    ]);
    table.add_row(vec!["Matched in basis".to_string(), summary.matched.to_string()]);
    table.add_row(vec!["Uncategorized".to_string(), summary.uncategorized.to_string()]);
    table
}
