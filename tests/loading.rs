//! Integration tests for loading sales tables from disk

mod common;

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use common::{sample_records, sample_table, set, write_csv, CSV_HEADER};
use parquet::arrow::ArrowWriter;
use rusty_barista::{
    load_file, write_view, DataLoadError, Engine, ExportError, FilterSpec, Record,
};
use tempfile::tempdir;

#[test]
fn test_csv_round_trip_keeps_records_and_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_csv(dir.path(), "sales.csv", &sample_records());

    let table = load_file(&path).expect("Failed to load CSV");
    assert_eq!(table.records(), sample_records().as_slice());
}

#[test]
fn test_total_sales_derived_for_every_row() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_csv(dir.path(), "sales.csv", &sample_records());

    let table = load_file(&path).expect("Failed to load CSV");
    for rec in table.records() {
        assert_eq!(rec.total_sales(), f64::from(rec.transaction_qty) * rec.unit_price);
        assert!(rec.total_sales() >= 0.0);
    }
}

#[test]
fn test_loading_twice_yields_equal_tables() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_csv(dir.path(), "sales.csv", &sample_records());

    let first = load_file(&path).expect("first load");
    let second = load_file(&path).expect("second load");
    assert_eq!(first, second);
}

#[test]
fn test_schema_mismatch_is_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("sales.csv");
    let header = CSV_HEADER.replace(",Hour", ",Hour_of_day");
    std::fs::write(&path, format!("{header}\n")).expect("write fixture");

    let err = load_file(&path).unwrap_err();
    assert!(matches!(err, DataLoadError::MissingColumn("Hour")));
    assert!(err.to_string().contains("Hour"));
}

#[test]
fn test_bad_row_rejects_whole_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut records = sample_records();
    records.truncate(2);
    let path = write_csv(dir.path(), "sales.csv", &records);
    let mut text = std::fs::read_to_string(&path).expect("read fixture");
    text.push_str("\n3,2023-01-01,07:06:11,two,5,Astoria,32,3.0,Coffee,Latte,January,Monday,7");
    std::fs::write(&path, text).expect("write fixture");

    match load_file(&path).unwrap_err() {
        DataLoadError::InvalidValue { row, column, value, .. } => {
            assert_eq!(row, 3);
            assert_eq!(column, "transaction_qty");
            assert_eq!(value, "two");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_json_file_loads() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("sales.json");
    let rows: Vec<serde_json::Value> = sample_records()
        .iter()
        .map(|r| serde_json::to_value(r).expect("serialize record"))
        .collect();
    std::fs::write(&path, serde_json::to_string(&rows).expect("encode")).expect("write fixture");

    let table = load_file(&path).expect("Failed to load JSON");
    assert_eq!(table.records(), sample_records().as_slice());
}

#[test]
fn test_parquet_file_loads() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("sales.parquet");
    let records = sample_records();

    let schema = Arc::new(Schema::new(vec![
        Field::new("transaction_id", DataType::Int32, false),
        Field::new("transaction_qty", DataType::Int32, false),
        Field::new("unit_price", DataType::Float64, false),
        Field::new("product_category", DataType::Utf8, false),
        Field::new("store_location", DataType::Utf8, false),
        Field::new("Month", DataType::Utf8, false),
        Field::new("Day", DataType::Utf8, false),
        Field::new("Hour", DataType::Int32, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.transaction_id as i32))),
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.transaction_qty as i32))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.unit_price))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.product_category))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.store_location))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.month))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.day))),
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| i32::from(r.hour)))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("build batch");

    let file = std::fs::File::create(&path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("create writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");

    let table = load_file(&path).expect("Failed to load Parquet");
    assert_eq!(table.records(), records.as_slice());
}

#[test]
fn test_loaded_table_drives_engine() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_csv(dir.path(), "sales.csv", &sample_records());
    let table = Arc::new(load_file(&path).expect("Failed to load CSV"));

    let engine = Engine::new(Arc::clone(&table));
    let (view, bundle) = engine.apply(&FilterSpec::all(&table));
    assert_eq!(view.len(), 9);
    let agg = bundle.filtered().expect("computed");
    assert!((agg.total_sales - (18.25 + 14.2 + 9.5)).abs() < 1e-9);
}

#[test]
fn test_parquet_without_rows_still_checks_schema() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.parquet");

    let schema = Arc::new(Schema::new(vec![Field::new("foo", DataType::Int64, false)]));
    let file = std::fs::File::create(&path).expect("create parquet file");
    let writer = ArrowWriter::try_new(file, schema, None).expect("create writer");
    writer.close().expect("close writer");

    let err = load_file(&path).unwrap_err();
    assert!(matches!(err, DataLoadError::MissingColumn("transaction_id")));
}

#[test]
fn test_parquet_without_rows_loads_empty_table() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.parquet");

    let engine = Engine::new(Arc::new(sample_table()));
    let (view, _) = engine.apply(&FilterSpec::default());
    assert_eq!(write_view(&view, &path).expect("export empty view"), 0);

    let reloaded = load_file(&path).expect("empty export loads");
    assert!(reloaded.is_empty());
}

#[test]
fn test_exported_view_reloads_to_same_records() {
    let dir = tempdir().expect("Failed to create temp dir");
    let table = Arc::new(sample_table());
    let engine = Engine::new(Arc::clone(&table));
    let spec = FilterSpec {
        months: set(&["February", "March"]),
        locations: set(&["Astoria"]),
        ..FilterSpec::all(&table)
    };
    let (view, _) = engine.apply(&spec);
    let expected: Vec<Record> = view.records().cloned().collect();
    assert_eq!(expected.len(), 3);

    for name in ["filtered.csv", "filtered.json", "filtered.parquet"] {
        let path = dir.path().join(name);
        let rows = write_view(&view, &path).expect("export view");
        assert_eq!(rows, expected.len());

        let reloaded = load_file(&path).expect("reload export");
        assert_eq!(reloaded.records(), expected.as_slice(), "{name}");
    }
}

#[test]
fn test_export_rejects_unknown_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let table = Arc::new(sample_table());
    let engine = Engine::new(Arc::clone(&table));
    let (view, _) = engine.apply(&FilterSpec::all(&table));

    let path = dir.path().join("filtered.xlsx");
    let err = write_view(&view, &path).unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedFormat(ext) if ext == "xlsx"));
    assert!(!path.exists());
}

#[test]
fn test_parquet_int64_columns_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ids.parquet");
    let records = sample_records();

    let schema = Arc::new(Schema::new(vec![
        Field::new("transaction_id", DataType::Int64, false),
        Field::new("transaction_qty", DataType::Int64, false),
        Field::new("unit_price", DataType::Float64, false),
        Field::new("product_category", DataType::Utf8, false),
        Field::new("store_location", DataType::Utf8, false),
        Field::new("month", DataType::Utf8, false),
        Field::new("day", DataType::Utf8, false),
        Field::new("hour", DataType::Int64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| r.transaction_id))),
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| i64::from(r.transaction_qty)))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.unit_price))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.product_category))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.store_location))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.month))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.day))),
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| i64::from(r.hour)))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("build batch");

    let file = std::fs::File::create(&path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("create writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");

    let table = load_file(&path).expect("Failed to load Parquet");
    assert_eq!(table.records(), records.as_slice());
}
