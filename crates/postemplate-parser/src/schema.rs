//! Column names shared by the readers and the transform.

pub const ITEM_SOURCE: &str = "item workbook";
pub const BASIS_SOURCE: &str = "basis dataset";

pub const ITEM_NAME: &str = "Item Name";
pub const CATEGORY_NAME: &str = "Category Name";
pub const RATE: &str = "Rate";

pub const POS_PRODUCT_NAME: &str = "Pos Product Name";
pub const PRODUCT_ID: &str = "Product Id";
pub const POS_CATEGORIES: &str = "Pos Categories";

pub const ITEM_COLUMNS: [&str; 3] = [ITEM_NAME, CATEGORY_NAME, RATE];
pub const BASIS_COLUMNS: [&str; 3] = [POS_PRODUCT_NAME, PRODUCT_ID, POS_CATEGORIES];

/// Returns the required columns that `present` lacks, in declaration order.
pub fn missing_columns<'a>(required: &[&'a str], present: &[&str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|name| !present.contains(name))
        .collect()
}
