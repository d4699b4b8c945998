//! Fixed 13-column POS import template.

pub const FEATURED_PRODUCT: &str = "Featured Product";
pub const POS_POINT_SHORT_NAME: &str = "Pos Point Short Name";
pub const POS_PRODUCT_NAME: &str = "Pos Product Name";
pub const PRODUCT_ID: &str = "Product Id";
pub const DESCRIPTION: &str = "Description";
pub const POS_CATEGORIES: &str = "Pos Categories";
pub const TAXES_SHORT_NAME: &str = "Taxes Short Name";
pub const POS_ATTRIBUTES: &str = "Pos Attributes";
pub const PRICE: &str = "Price";
pub const NC_VALUE: &str = "NC value(%)";
pub const UNIT_SHORT_NAME: &str = "Unit Short Name";
pub const KITCHEN_CODE: &str = "Kitchen Code";
pub const STATUS: &str = "Status";

pub const OUTPUT_COLUMNS: [&str; 13] = [
    FEATURED_PRODUCT,
    POS_POINT_SHORT_NAME,
    POS_PRODUCT_NAME,
    PRODUCT_ID,
    DESCRIPTION,
    POS_CATEGORIES,
    TAXES_SHORT_NAME,
    POS_ATTRIBUTES,
    PRICE,
    NC_VALUE,
    UNIT_SHORT_NAME,
    KITCHEN_CODE,
    STATUS,
];

pub const FEATURED_PRODUCT_VALUE: &str = "N";
pub const POS_POINT_SHORT_NAME_VALUE: &str = "RMS";
pub const UNIT_SHORT_NAME_VALUE: &str = "Unit";
pub const STATUS_VALUE: &str = "A";

/// Columns the POS import expects to exist but which are always left blank.
pub const BLANK_COLUMNS: [&str; 5] = [
    DESCRIPTION,
    TAXES_SHORT_NAME,
    POS_ATTRIBUTES,
    NC_VALUE,
    KITCHEN_CODE,
];

/// Category assigned to items that have no category in the basis dataset.
pub const UNCATEGORIZED: &str = "UNCATEGORIZED";
