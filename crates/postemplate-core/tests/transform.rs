use polars::prelude::*;
use postemplate_core::outputs::write_csv;
use postemplate_core::pricing::PricingPolicy;
use postemplate_core::template::{self, OUTPUT_COLUMNS, UNCATEGORIZED};
use postemplate_core::{enrich_items, TableKind, TransformError};

fn imported(names: &[&str], categories: &[Option<&str>], rates: &[f64]) -> DataFrame {
    df![
        "Item Name" => names,
        "Category Name" => categories,
        "Rate" => rates,
    ]
    .expect("imported df")
}

fn basis(names: &[&str], ids: &[&str], categories: &[Option<&str>]) -> DataFrame {
    df![
        "Pos Product Name" => names,
        "Product Id" => ids,
        "Pos Categories" => categories,
    ]
    .expect("basis df")
}

fn empty_basis() -> DataFrame {
    basis(&[], &[], &[])
}

fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .expect("column")
        .str()
        .expect("string column")
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

fn product_ids(df: &DataFrame) -> Vec<Option<i64>> {
    df.column(template::PRODUCT_ID)
        .expect("column")
        .i64()
        .expect("int column")
        .into_iter()
        .collect()
}

fn prices(df: &DataFrame) -> Vec<Option<f64>> {
    df.column(template::PRICE)
        .expect("column")
        .f64()
        .expect("float column")
        .into_iter()
        .collect()
}

#[test]
fn duplicate_items_collapse_to_first_occurrence() {
    let items = imported(&["Coke", "Coke"], &[Some("Bev"), Some("Bev")], &[56.0, 60.0]);
    let catalog = basis(&["Coke"], &["101"], &[Some("Beverages")]);

    let outcome = enrich_items(&items, &catalog, &PricingPolicy::default()).expect("transform");
    let df = &outcome.dataframe;

    assert_eq!(df.height(), 1);
    assert!(!outcome.had_unmatched);
    assert_eq!(strings(df, template::POS_PRODUCT_NAME), vec![Some("Coke".into())]);
    assert_eq!(product_ids(df), vec![Some(101)]);
    assert_eq!(strings(df, template::POS_CATEGORIES), vec![Some("Beverages".into())]);
    assert_eq!(prices(df), vec![Some(50.0)]);
    assert_eq!(strings(df, template::FEATURED_PRODUCT), vec![Some("N".into())]);
    assert_eq!(strings(df, template::STATUS), vec![Some("A".into())]);

    assert_eq!(outcome.summary.imported_rows, 2);
    assert_eq!(outcome.summary.duplicates_dropped, 1);
    assert_eq!(outcome.summary.matched, 1);
}

#[test]
fn unmatched_item_is_uncategorized_and_flagged() {
    let items = imported(&["Mystery Snack"], &[Some("")], &[112.0]);

    let outcome =
        enrich_items(&items, &empty_basis(), &PricingPolicy::default()).expect("transform");
    let df = &outcome.dataframe;

    assert!(outcome.had_unmatched);
    assert_eq!(product_ids(df), vec![None]);
    assert_eq!(strings(df, template::POS_CATEGORIES), vec![Some(UNCATEGORIZED.into())]);
    assert_eq!(prices(df), vec![Some(100.0)]);
    assert_eq!(outcome.summary.uncategorized, 1);
}

#[test]
fn output_has_fixed_schema_and_constants() {
    let items = imported(&["Coke", "Tea"], &[None, None], &[56.0, 28.0]);
    let catalog = basis(&["Coke"], &["7"], &[Some("Beverages")]);

    let df = enrich_items(&items, &catalog, &PricingPolicy::default())
        .expect("transform")
        .dataframe;

    let names: Vec<&str> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(names, OUTPUT_COLUMNS);

    let constants = [
        (template::FEATURED_PRODUCT, "N"),
        (template::POS_POINT_SHORT_NAME, "RMS"),
        (template::UNIT_SHORT_NAME, "Unit"),
        (template::STATUS, "A"),
    ];
    for (column, expected) in constants {
        assert_eq!(
            strings(&df, column),
            vec![Some(expected.to_string()); 2],
            "column {column}"
        );
    }

    for column in template::BLANK_COLUMNS {
        assert_eq!(strings(&df, column), vec![None; 2], "column {column}");
    }
}

#[test]
fn rows_sort_by_product_id_with_unmatched_last() {
    let items = imported(
        &["Fries", "Ghost A", "Coke", "Ghost B", "Tea"],
        &[None; 5],
        &[112.0, 1.0, 56.0, 2.0, 11.2],
    );
    let catalog = basis(
        &["Coke", "Fries", "Tea"],
        &["101", "205", "150"],
        &[Some("Beverages"), Some("Sides"), Some("Beverages")],
    );

    let df = enrich_items(&items, &catalog, &PricingPolicy::default())
        .expect("transform")
        .dataframe;

    assert_eq!(
        strings(&df, template::POS_PRODUCT_NAME),
        vec![
            Some("Coke".into()),
            Some("Tea".into()),
            Some("Fries".into()),
            Some("Ghost A".into()),
            Some("Ghost B".into()),
        ]
    );
    assert_eq!(product_ids(&df), vec![Some(101), Some(150), Some(205), None, None]);
    assert_eq!(
        prices(&df),
        vec![Some(50.0), Some(10.0), Some(100.0), Some(0.89), Some(1.79)]
    );
}

#[test]
fn basis_duplicates_keep_first_row() {
    let items = imported(&["Coke"], &[None], &[56.0]);
    let catalog = basis(
        &["Coke", "Coke"],
        &["101", "999"],
        &[Some("Beverages"), Some("Other")],
    );

    let df = enrich_items(&items, &catalog, &PricingPolicy::default())
        .expect("transform")
        .dataframe;

    assert_eq!(product_ids(&df), vec![Some(101)]);
    assert_eq!(strings(&df, template::POS_CATEGORIES), vec![Some("Beverages".into())]);
}

#[test]
fn matched_item_without_category_still_counts_as_unmatched() {
    let items = imported(&["Coke"], &[None], &[56.0]);
    let catalog = basis(&["Coke"], &["101"], &[None]);

    let outcome = enrich_items(&items, &catalog, &PricingPolicy::default()).expect("transform");

    assert!(outcome.had_unmatched);
    assert_eq!(product_ids(&outcome.dataframe), vec![Some(101)]);
    assert_eq!(
        strings(&outcome.dataframe, template::POS_CATEGORIES),
        vec![Some(UNCATEGORIZED.into())]
    );
}

#[test]
fn whitespace_category_is_kept_verbatim() {
    let items = imported(&["Coke"], &[None], &[56.0]);
    let catalog = basis(&["Coke"], &["101"], &[Some("  ")]);

    let outcome = enrich_items(&items, &catalog, &PricingPolicy::default()).expect("transform");

    assert!(!outcome.had_unmatched);
    assert_eq!(outcome.summary.uncategorized, 0);
    assert_eq!(
        strings(&outcome.dataframe, template::POS_CATEGORIES),
        vec![Some("  ".into())]
    );
}

#[test]
fn textual_product_ids_sort_after_numeric_ones() {
    let items = imported(&["Coke", "Cake", "Tea"], &[None; 3], &[56.0, 56.0, 56.0]);
    let catalog = basis(
        &["Coke", "Cake", "Tea"],
        &["SKU-2", "40.0", "SKU-1"],
        &[Some("Beverages"), Some("Dessert"), Some("Beverages")],
    );

    let df = enrich_items(&items, &catalog, &PricingPolicy::default())
        .expect("transform")
        .dataframe;

    assert_eq!(
        strings(&df, template::PRODUCT_ID),
        vec![Some("40".into()), Some("SKU-1".into()), Some("SKU-2".into())]
    );
}

#[test]
fn missing_columns_are_schema_errors() {
    let items = df!["Item Name" => ["Coke"], "Category Name" => ["Bev"]].unwrap();
    match enrich_items(&items, &empty_basis(), &PricingPolicy::default()) {
        Err(TransformError::MissingColumn { table, column }) => {
            assert_eq!(table, TableKind::Imported);
            assert_eq!(column, "Rate");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }

    let items = imported(&["Coke"], &[None], &[56.0]);
    let catalog = df!["Pos Product Name" => ["Coke"], "Pos Categories" => ["Bev"]].unwrap();
    match enrich_items(&items, &catalog, &PricingPolicy::default()) {
        Err(TransformError::MissingColumn { table, column }) => {
            assert_eq!(table, TableKind::Basis);
            assert_eq!(column, "Product Id");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn non_numeric_rate_fails_only_for_retained_rows() {
    let items = df![
        "Item Name" => ["Coke", "Coke", "Tea"],
        "Category Name" => ["Bev", "Bev", "Bev"],
        "Rate" => ["56", "not a number", "11.20"],
    ]
    .unwrap();

    let outcome = enrich_items(&items, &empty_basis(), &PricingPolicy::default())
        .expect("dropped duplicate must not be validated");
    assert_eq!(prices(&outcome.dataframe), vec![Some(50.0), Some(10.0)]);

    let items = df![
        "Item Name" => ["Coke", "Tea"],
        "Category Name" => ["Bev", "Bev"],
        "Rate" => ["56", "ten"],
    ]
    .unwrap();
    match enrich_items(&items, &empty_basis(), &PricingPolicy::default()) {
        Err(TransformError::NonNumericRate { item, value }) => {
            assert_eq!(item, "Tea");
            assert_eq!(value, "ten");
        }
        other => panic!("expected NonNumericRate, got {other:?}"),
    }
}

#[test]
fn negative_and_missing_rates_pass_through() {
    let items = df![
        "Item Name" => ["Refund", "Free"],
        "Category Name" => [None::<&str>, None],
        "Rate" => [Some(-112.0), None],
    ]
    .unwrap();

    let df = enrich_items(&items, &empty_basis(), &PricingPolicy::default())
        .expect("transform")
        .dataframe;

    assert_eq!(prices(&df), vec![Some(-100.0), None]);
}

#[test]
fn integer_product_ids_from_typed_basis_are_accepted() {
    let items = imported(&["Coke"], &[None], &[56.0]);
    let catalog = df![
        "Pos Product Name" => ["Coke"],
        "Product Id" => [101i64],
        "Pos Categories" => ["Beverages"],
    ]
    .unwrap();

    let df = enrich_items(&items, &catalog, &PricingPolicy::default())
        .expect("transform")
        .dataframe;

    assert_eq!(product_ids(&df), vec![Some(101)]);
}

#[test]
fn repeated_runs_serialize_identically() {
    let items = imported(
        &["Fries", "Coke", "Ghost", "Coke"],
        &[None; 4],
        &[99.5, 56.0, 12.34, 1.0],
    );
    let catalog = basis(
        &["Coke", "Fries"],
        &["101", "205"],
        &[Some("Beverages"), Some("Sides")],
    );
    let policy = PricingPolicy::default();

    let first = enrich_items(&items, &catalog, &policy).expect("first run");
    let second = enrich_items(&items, &catalog, &policy).expect("second run");

    assert_eq!(
        write_csv(&first.dataframe).unwrap(),
        write_csv(&second.dataframe).unwrap()
    );
}
