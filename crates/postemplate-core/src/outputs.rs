use std::io::Cursor;

use polars::prelude::*;

pub const FALLBACK_STEM: &str = "pos_template";

/// Serializes the template as UTF-8 CSV with a header row and no index column.
pub fn write_csv(df: &DataFrame) -> PolarsResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let mut clone = df.clone();
        CsvWriter::new(&mut cursor)
            .include_header(true)
            .finish(&mut clone)?;
    }
    Ok(buffer)
}

/// Name of the generated file: the uploaded file's base name with a `.csv` extension.
///
/// Directory components are dropped and the stem is reduced to ASCII alphanumerics plus
/// `._-`, with whitespace folded into `_`.
pub fn download_filename(uploaded: &str) -> String {
    let base = uploaded
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(uploaded);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let sanitized = stem
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
        .collect::<String>();
    let trimmed = sanitized.trim_matches(|ch| ch == '.' || ch == '_');

    if trimmed.is_empty() {
        format!("{FALLBACK_STEM}.csv")
    } else {
        format!("{trimmed}.csv")
    }
}
