use std::io::Cursor;

use polars::prelude::*;

use crate::errors::ParserError;
use crate::schema::BASIS_SOURCE;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses the basis catalog CSV with every column typed as `String`. `Product Id` is
/// interpreted later: integral values such as `0042` or `101.0` become numeric ids (42, 101)
/// and everything else stays text.
pub fn read_basis_csv(bytes: &[u8]) -> Result<DataFrame, ParserError> {
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()
        .map_err(|source| ParserError::Csv {
            source_kind: BASIS_SOURCE,
            source,
        })
}
