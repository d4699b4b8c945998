// crates/postemplate-core/src/error.rs

use std::fmt;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use postemplate_parser::ParserError;
use thiserror::Error;

/// Which input table a schema problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Imported,
    Basis,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Imported => f.write_str("imported item list"),
            TableKind::Basis => f.write_str("basis dataset"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{table} is missing required column '{column}'")]
    MissingColumn {
        table: TableKind,
        column: &'static str,
    },

    #[error("rate for item '{item}' is not numeric: '{value}'")]
    NonNumericRate { item: String, value: String },

    #[error("base price for item '{item}' is out of range (rate {rate})")]
    PriceOutOfRange { item: String, rate: String },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("reference dataset not found at '{}'", path.display())]
    ReferenceDataMissing { path: PathBuf },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
