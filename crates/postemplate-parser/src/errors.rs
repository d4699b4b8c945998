use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{source_kind} could not be opened as a spreadsheet: {message}")]
    Workbook {
        source_kind: &'static str,
        message: String,
    },

    #[error("{source_kind} does not contain any sheets")]
    NoSheets { source_kind: &'static str },

    #[error("{source_kind} sheet '{sheet}' has no header row")]
    EmptySheet {
        source_kind: &'static str,
        sheet: String,
    },

    #[error("{source_kind} CSV error: {source}")]
    Csv {
        source_kind: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("failed to assemble {source_kind} table: {source}")]
    Polars {
        source_kind: &'static str,
        #[source]
        source: PolarsError,
    },
}
