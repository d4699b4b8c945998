use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use polars::prelude::*;
use postemplate_parser::render_number;
use postemplate_parser::schema::{self, BASIS_COLUMNS, ITEM_COLUMNS};
use rust_decimal::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{TableKind, TransformError};
use crate::pricing::{parse_rate, PricingPolicy};
use crate::template::{
    BLANK_COLUMNS, FEATURED_PRODUCT, FEATURED_PRODUCT_VALUE, POS_CATEGORIES, POS_POINT_SHORT_NAME,
    POS_POINT_SHORT_NAME_VALUE, POS_PRODUCT_NAME, PRICE, PRODUCT_ID, STATUS, STATUS_VALUE,
    UNCATEGORIZED, UNIT_SHORT_NAME, UNIT_SHORT_NAME_VALUE,
};

/// Canonical product identifier taken from the basis dataset.
///
/// Integral values (`"101"`, `"101.0"`) are numeric; anything else is kept as text. Numeric
/// identifiers order before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductId {
    Numeric(i64),
    Text(String),
}

impl ProductId {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Some(ProductId::Numeric(value));
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
                return Some(ProductId::Numeric(value as i64));
            }
        }
        Some(ProductId::Text(trimmed.to_string()))
    }

    fn as_numeric(&self) -> Option<i64> {
        match self {
            ProductId::Numeric(value) => Some(*value),
            ProductId::Text(_) => None,
        }
    }
}

impl Ord for ProductId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ProductId::Numeric(a), ProductId::Numeric(b)) => a.cmp(b),
            (ProductId::Numeric(_), ProductId::Text(_)) => Ordering::Less,
            (ProductId::Text(_), ProductId::Numeric(_)) => Ordering::Greater,
            (ProductId::Text(a), ProductId::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ProductId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Numeric(value) => write!(f, "{value}"),
            ProductId::Text(value) => f.write_str(value),
        }
    }
}

/// Rows lacking an identifier sort after every row that has one.
pub fn compare_product_ids(a: Option<&ProductId>, b: Option<&ProductId>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformSummary {
    pub imported_rows: usize,
    pub distinct_items: usize,
    pub duplicates_dropped: usize,
    pub matched: usize,
    pub uncategorized: usize,
}

#[derive(Debug)]
pub struct EnrichmentOutcome {
    pub dataframe: DataFrame,
    /// At least one item had no category after the join, before the fallback was applied.
    pub had_unmatched: bool,
    pub summary: TransformSummary,
}

#[derive(Debug, Clone)]
struct BasisEntry {
    product_id: Option<ProductId>,
    category: Option<String>,
}

#[derive(Debug, Clone)]
enum RateCell {
    Missing,
    Number(f64),
    Text(String),
}

/// An imported item after the left join; the category is still nullable here.
#[derive(Debug, Clone)]
struct JoinedItem {
    item_name: Option<String>,
    product_id: Option<ProductId>,
    category: Option<String>,
    price: Option<Decimal>,
}

#[derive(Debug, Clone)]
struct TemplateRow {
    item_name: Option<String>,
    product_id: Option<ProductId>,
    category: String,
    price: Option<Decimal>,
}

impl From<JoinedItem> for TemplateRow {
    fn from(item: JoinedItem) -> Self {
        Self {
            item_name: item.item_name,
            product_id: item.product_id,
            category: item.category.unwrap_or_else(|| UNCATEGORIZED.to_string()),
            price: item.price,
        }
    }
}

/// Builds the POS import template from the imported item list and the basis catalog.
///
/// Neither input is modified. Imported items are deduplicated by `Item Name` (first wins),
/// left-joined to the deduplicated basis projection, priced, sorted by `Product Id` with
/// unmatched rows last, and projected into the fixed template columns.
pub fn enrich_items(
    imported: &DataFrame,
    basis: &DataFrame,
    policy: &PricingPolicy,
) -> Result<EnrichmentOutcome, TransformError> {
    require_columns(imported, TableKind::Imported, &ITEM_COLUMNS)?;
    require_columns(basis, TableKind::Basis, &BASIS_COLUMNS)?;

    let item_names = text_values(imported.column(schema::ITEM_NAME)?)?;
    let rates = rate_cells(imported.column(schema::RATE)?)?;
    let retained = first_occurrences(&item_names);
    let lookup = basis_lookup(basis)?;

    let mut joined = Vec::with_capacity(retained.len());
    let mut matched = 0;

    for idx in retained {
        let item_name = item_names[idx].clone();
        let entry = item_name.as_deref().and_then(|name| lookup.get(name));
        if entry.is_some() {
            matched += 1;
        }

        let price = match resolve_rate(&rates[idx], item_name.as_deref())? {
            Some(rate) => Some(policy.base_price(rate).ok_or_else(|| {
                TransformError::PriceOutOfRange {
                    item: display_name(item_name.as_deref()),
                    rate: rate.to_string(),
                }
            })?),
            None => None,
        };

        joined.push(JoinedItem {
            item_name,
            product_id: entry.and_then(|entry| entry.product_id.clone()),
            category: entry.and_then(|entry| entry.category.clone()),
            price,
        });
    }

    let uncategorized = joined.iter().filter(|item| item.category.is_none()).count();
    let had_unmatched = uncategorized > 0;

    let mut rows: Vec<TemplateRow> = joined.into_iter().map(TemplateRow::from).collect();
    // Vec::sort_by is stable, so rows sharing an id (or lacking one) keep their input order.
    rows.sort_by(|a, b| compare_product_ids(a.product_id.as_ref(), b.product_id.as_ref()));

    let summary = TransformSummary {
        imported_rows: imported.height(),
        distinct_items: rows.len(),
        duplicates_dropped: imported.height() - rows.len(),
        matched,
        uncategorized,
    };
    debug!(?summary, had_unmatched, "Enrichment transform finished");

    Ok(EnrichmentOutcome {
        dataframe: build_template(&rows)?,
        had_unmatched,
        summary,
    })
}

fn require_columns(
    df: &DataFrame,
    table: TableKind,
    required: &[&'static str],
) -> Result<(), TransformError> {
    let present: Vec<&str> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();

    match schema::missing_columns(required, &present).first().copied() {
        Some(column) => Err(TransformError::MissingColumn { table, column }),
        None => Ok(()),
    }
}

/// Reads a column as nullable text; integral floats lose their `.0`.
fn text_values(column: &Column) -> PolarsResult<Vec<Option<String>>> {
    match column.dtype() {
        DataType::String => Ok(column
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect()),
        DataType::Float32 | DataType::Float64 => {
            let casted = column.cast(&DataType::Float64)?;
            Ok(casted
                .f64()?
                .into_iter()
                .map(|value| value.map(render_number))
                .collect())
        }
        _ => {
            let casted = column.cast(&DataType::String)?;
            Ok(casted
                .str()?
                .into_iter()
                .map(|value| value.map(str::to_string))
                .collect())
        }
    }
}

fn rate_cells(column: &Column) -> PolarsResult<Vec<RateCell>> {
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|value| match value {
                Some(text) => RateCell::Text(text.to_string()),
                None => RateCell::Missing,
            })
            .collect());
    }

    let casted = column.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .map(|value| value.map_or(RateCell::Missing, RateCell::Number))
        .collect())
}

fn resolve_rate(cell: &RateCell, item: Option<&str>) -> Result<Option<Decimal>, TransformError> {
    match cell {
        RateCell::Missing => Ok(None),
        RateCell::Number(value) if value.is_nan() => Ok(None),
        RateCell::Number(value) => Decimal::from_f64(*value).map(Some).ok_or_else(|| {
            TransformError::PriceOutOfRange {
                item: display_name(item),
                rate: value.to_string(),
            }
        }),
        RateCell::Text(text) if text.trim().is_empty() => Ok(None),
        RateCell::Text(text) => parse_rate(text)
            .map(Some)
            .ok_or_else(|| non_numeric(item, text.clone())),
    }
}

fn non_numeric(item: Option<&str>, value: String) -> TransformError {
    TransformError::NonNumericRate {
        item: display_name(item),
        value,
    }
}

fn display_name(item: Option<&str>) -> String {
    item.unwrap_or("<missing item name>").to_string()
}

/// Row indices of the first occurrence of every item name. Missing names share one key.
fn first_occurrences(names: &[Option<String>]) -> Vec<usize> {
    let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(names.len());
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| seen.insert(name.as_deref()))
        .map(|(idx, _)| idx)
        .collect()
}

/// Projects the basis catalog to name -> (id, category), keeping the first row per name.
fn basis_lookup(basis: &DataFrame) -> Result<HashMap<String, BasisEntry>, TransformError> {
    let names = text_values(basis.column(schema::POS_PRODUCT_NAME)?)?;
    let ids = text_values(basis.column(schema::PRODUCT_ID)?)?;
    let categories = text_values(basis.column(schema::POS_CATEGORIES)?)?;

    let mut lookup: HashMap<String, BasisEntry> = HashMap::with_capacity(names.len());
    for ((name, id), category) in names.into_iter().zip(ids).zip(categories) {
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            continue;
        };
        lookup.entry(name).or_insert_with(|| BasisEntry {
            product_id: id.as_deref().and_then(ProductId::parse),
            category: category.filter(|value| !value.is_empty()),
        });
    }

    Ok(lookup)
}

fn build_template(rows: &[TemplateRow]) -> PolarsResult<DataFrame> {
    let height = rows.len();
    let constant = |name: &str, value: &str| -> Column {
        Series::new(name.into(), vec![value; height]).into()
    };
    let blank = |name: &str| -> Column {
        Series::full_null(name.into(), height, &DataType::String).into()
    };

    let names: Vec<Option<&str>> = rows.iter().map(|row| row.item_name.as_deref()).collect();
    let categories: Vec<&str> = rows.iter().map(|row| row.category.as_str()).collect();
    let prices: Vec<Option<f64>> = rows
        .iter()
        .map(|row| row.price.and_then(|price| price.to_f64()))
        .collect();

    let all_numeric = rows
        .iter()
        .filter_map(|row| row.product_id.as_ref())
        .all(|id| id.as_numeric().is_some());
    let product_ids: Column = if all_numeric {
        let values: Vec<Option<i64>> = rows
            .iter()
            .map(|row| row.product_id.as_ref().and_then(ProductId::as_numeric))
            .collect();
        Series::new(PRODUCT_ID.into(), values).into()
    } else {
        let values: Vec<Option<String>> = rows
            .iter()
            .map(|row| row.product_id.as_ref().map(ProductId::to_string))
            .collect();
        Series::new(PRODUCT_ID.into(), values).into()
    };

    let [description, taxes_short_name, pos_attributes, nc_value, kitchen_code] = BLANK_COLUMNS;

    DataFrame::new(vec![
        constant(FEATURED_PRODUCT, FEATURED_PRODUCT_VALUE),
        constant(POS_POINT_SHORT_NAME, POS_POINT_SHORT_NAME_VALUE),
        Series::new(POS_PRODUCT_NAME.into(), names).into(),
        product_ids,
        blank(description),
        Series::new(POS_CATEGORIES.into(), categories).into(),
        blank(taxes_short_name),
        blank(pos_attributes),
        Series::new(PRICE.into(), prices).into(),
        blank(nc_value),
        constant(UNIT_SHORT_NAME, UNIT_SHORT_NAME_VALUE),
        blank(kitchen_code),
        constant(STATUS, STATUS_VALUE),
    ])
}
