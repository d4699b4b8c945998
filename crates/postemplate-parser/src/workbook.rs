use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::{NaiveDate, TimeDelta};
use polars::prelude::*;

use crate::errors::ParserError;
use crate::schema::ITEM_SOURCE;

/// A single worksheet cell reduced to what the item table cares about.
#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Empty,
    Number(f64),
    /// Date, time or duration cell; never treated as a number.
    Date(String),
    Text(String),
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

impl CellValue {
    fn from_data(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::Error(e) => CellValue::Text(format!("#{e:?}")),
            Data::DateTime(dt) => CellValue::Date(render_datetime(dt)),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(render_number(*n)),
            CellValue::Date(s) | CellValue::Text(s) => Some(s.clone()),
        }
    }
}

/// Formats a spreadsheet number as text, dropping the fraction for integral values.
pub fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Renders an Excel date serial (1900 system) as `YYYY-MM-DD HH:MM:SS`, or a duration as
/// ISO 8601. Serials outside chrono's range keep a `#DATE` marker so they never read as numbers.
fn render_datetime(dt: &ExcelDateTime) -> String {
    let serial = dt.as_f64();
    let delta = TimeDelta::try_milliseconds((serial * MILLIS_PER_DAY).round() as i64);

    let rendered = if dt.is_duration() {
        delta.map(|delta| delta.to_string())
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
            .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
            .zip(delta)
            .and_then(|(epoch, delta)| epoch.checked_add_signed(delta))
            .map(|moment| moment.format("%Y-%m-%d %H:%M:%S").to_string())
    };

    rendered.unwrap_or_else(|| format!("#DATE {}", render_number(serial)))
}

/// Reads the first worksheet of an uploaded workbook into a DataFrame.
///
/// The first row of the used range is the header. Columns whose non-empty cells are all
/// numeric become `Float64`; every other column is `String`. Date cells are rendered as text
/// and therefore always produce a `String` column.
pub fn read_item_workbook(bytes: &[u8]) -> Result<DataFrame, ParserError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|err| ParserError::Workbook {
            source_kind: ITEM_SOURCE,
            message: err.to_string(),
        })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParserError::NoSheets {
            source_kind: ITEM_SOURCE,
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParserError::NoSheets {
            source_kind: ITEM_SOURCE,
        })?
        .map_err(|err| ParserError::Workbook {
            source_kind: ITEM_SOURCE,
            message: err.to_string(),
        })?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(CellValue::from_data).collect::<Vec<_>>())
        .filter(|cells| !cells.iter().all(CellValue::is_empty));

    let header = rows.next().ok_or_else(|| ParserError::EmptySheet {
        source_kind: ITEM_SOURCE,
        sheet: sheet_name.clone(),
    })?;
    let names = header_names(&header);
    let body: Vec<Vec<CellValue>> = rows.collect();

    let columns = names
        .iter()
        .enumerate()
        .map(|(idx, name)| build_column(name, idx, &body))
        .collect::<Vec<Column>>();

    DataFrame::new(columns).map_err(|source| ParserError::Polars {
        source_kind: ITEM_SOURCE,
        source,
    })
}

/// Names header cells, filling blanks and suffixing repeats so every name is unique.
fn header_names(header: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());

    for (idx, cell) in header.iter().enumerate() {
        let base = cell
            .as_text()
            .unwrap_or_else(|| format!("Unnamed: {idx}"));
        let count = seen.entry(base.clone()).or_insert(0);
        let name = if *count == 0 {
            base.clone()
        } else {
            format!("{base}.{count}")
        };
        *count += 1;
        names.push(name);
    }

    names
}

fn build_column(name: &str, idx: usize, body: &[Vec<CellValue>]) -> Column {
    let cells = body
        .iter()
        .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Empty));

    let all_numeric = body.iter().all(|row| {
        matches!(
            row.get(idx),
            None | Some(CellValue::Empty) | Some(CellValue::Number(_))
        )
    });

    if all_numeric {
        let values: Vec<Option<f64>> = cells
            .map(|cell| match cell {
                CellValue::Number(n) => Some(n),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values).into()
    } else {
        let values: Vec<Option<String>> = cells.map(|cell| cell.as_text()).collect();
        Series::new(name.into(), values).into()
    }
}
