use polars::prelude::DataFrame;
use postemplate_parser::read_item_workbook;
use tracing::info;

use crate::error::Result;
use crate::outputs::write_csv;
use crate::pricing::PricingPolicy;
use crate::transform::{enrich_items, TransformSummary};

/// Serialized POS template ready to hand to the caller.
#[derive(Debug, Clone)]
pub struct GeneratedTemplate {
    pub csv: Vec<u8>,
    pub had_unmatched: bool,
    pub summary: TransformSummary,
}

/// Parses an uploaded workbook, enriches it against `basis` and serializes the result.
pub fn generate_template(
    workbook: &[u8],
    basis: &DataFrame,
    policy: &PricingPolicy,
) -> Result<GeneratedTemplate> {
    let fingerprint = blake3::hash(workbook).to_hex().to_string();
    let imported = read_item_workbook(workbook)?;
    let outcome = enrich_items(&imported, basis, policy)?;
    let csv = write_csv(&outcome.dataframe)?;

    info!(
        workbook_hash = %fingerprint,
        imported_rows = outcome.summary.imported_rows,
        distinct_items = outcome.summary.distinct_items,
        matched = outcome.summary.matched,
        uncategorized = outcome.summary.uncategorized,
        "Generated POS template"
    );

    Ok(GeneratedTemplate {
        csv,
        had_unmatched: outcome.had_unmatched,
        summary: outcome.summary,
    })
}
