// crates/postemplate-core/src/reference.rs

use std::fs;
use std::path::Path;

use polars::prelude::DataFrame;
use postemplate_parser::read_basis_csv;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Loads the basis catalog from its well-known location. Read fresh on every call.
pub fn load_reference_dataset(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::ReferenceDataMissing {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path)?;
    let basis = read_basis_csv(&bytes)?;
    debug!(path = %path.display(), rows = basis.height(), "Loaded reference dataset");
    Ok(basis)
}
