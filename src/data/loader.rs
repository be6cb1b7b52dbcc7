use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataLoadError;
use super::model::{FilterDimension, Record, Table};

type Result<T> = std::result::Result<T, DataLoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one transaction per line (the source export)
/// * `.json`    – `[{ "transaction_id": 1, "Month": "January", ... }, ...]`
/// * `.parquet` – one column per field, numeric or text typed
///
/// Callers load once and share the resulting table; calling this again
/// re-reads the file and yields an equal table.
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(open(path)?),
        "json" => read_json(open(path)?),
        "parquet" | "pq" => read_parquet(open(path)?),
        other => Err(DataLoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records from {} ({} months, {} categories, {} locations)",
        table.len(),
        path.display(),
        table.options(FilterDimension::Month).len(),
        table.options(FilterDimension::Category).len(),
        table.options(FilterDimension::Location).len(),
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Required columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    TransactionId,
    TransactionQty,
    UnitPrice,
    ProductCategory,
    StoreLocation,
    Month,
    Day,
    Hour,
}

const REQUIRED_COLUMNS: [Column; 8] = [
    Column::TransactionId,
    Column::TransactionQty,
    Column::UnitPrice,
    Column::ProductCategory,
    Column::StoreLocation,
    Column::Month,
    Column::Day,
    Column::Hour,
];

impl Column {
    fn name(self) -> &'static str {
        match self {
            Column::TransactionId => "transaction_id",
            Column::TransactionQty => "transaction_qty",
            Column::UnitPrice => "unit_price",
            Column::ProductCategory => "product_category",
            Column::StoreLocation => "store_location",
            Column::Month => "Month",
            Column::Day => "Day",
            Column::Hour => "Hour",
        }
    }

    /// Source exports disagree on capitalisation (`Month` vs `month`).
    fn matches(self, header: &str) -> bool {
        header.trim().eq_ignore_ascii_case(self.name())
    }
}

/// Position of every required column among `headers`, in `REQUIRED_COLUMNS` order.
fn locate_columns<S: AsRef<str>>(headers: &[S]) -> Result<[usize; 8]> {
    let mut positions = [0usize; 8];
    for (slot, col) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| col.matches(h.as_ref()))
            .ok_or(DataLoadError::MissingColumn(col.name()))?;
    }
    Ok(positions)
}

// ---------------------------------------------------------------------------
// Cell conversion shared by every format
// ---------------------------------------------------------------------------

/// A raw cell as read from the source, before validation.
#[derive(Debug, Clone, PartialEq, Default)]
enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    #[default]
    Null,
}

impl RawValue {
    fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            RawValue::Null
        } else {
            RawValue::Text(s.to_string())
        }
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) => f.to_string(),
            RawValue::Text(s) => s.clone(),
            RawValue::Null => String::new(),
        }
    }
}

fn invalid(row: usize, col: Column, raw: &RawValue, reason: &'static str) -> DataLoadError {
    DataLoadError::InvalidValue {
        row,
        column: col.name(),
        value: raw.describe(),
        reason,
    }
}

fn to_i64(row: usize, col: Column, raw: &RawValue) -> Result<i64> {
    match raw {
        RawValue::Int(i) => Ok(*i),
        RawValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        RawValue::Text(s) => s
            .parse::<i64>()
            .map_err(|_| invalid(row, col, raw, "not an integer")),
        RawValue::Null => Err(invalid(row, col, raw, "missing value")),
        RawValue::Float(_) => Err(invalid(row, col, raw, "not an integer")),
    }
}

fn to_f64(row: usize, col: Column, raw: &RawValue) -> Result<f64> {
    match raw {
        RawValue::Int(i) => Ok(*i as f64),
        RawValue::Float(f) => Ok(*f),
        RawValue::Text(s) => s
            .parse::<f64>()
            .map_err(|_| invalid(row, col, raw, "not a number")),
        RawValue::Null => Err(invalid(row, col, raw, "missing value")),
    }
}

fn to_label(row: usize, col: Column, raw: &RawValue) -> Result<String> {
    match raw {
        RawValue::Text(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        RawValue::Int(_) | RawValue::Float(_) => Ok(raw.describe()),
        _ => Err(invalid(row, col, raw, "empty label")),
    }
}

/// Validate one row and derive `total_sales`.
///
/// `cells` holds the raw values in `REQUIRED_COLUMNS` order; `row` is the
/// 1-based data row used in error messages.
fn build_record(row: usize, cells: &[RawValue; 8]) -> Result<Record> {
    let [id, qty, price, category, location, month, day, hour] = cells;

    let transaction_id = to_i64(row, Column::TransactionId, id)?;

    let transaction_qty = to_i64(row, Column::TransactionQty, qty)?;
    let transaction_qty = u32::try_from(transaction_qty)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| invalid(row, Column::TransactionQty, qty, "must be a positive integer"))?;

    let unit_price = to_f64(row, Column::UnitPrice, price)?;
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(invalid(row, Column::UnitPrice, price, "must be a non-negative amount"));
    }

    let hour_value = to_i64(row, Column::Hour, hour)?;
    let hour_value = u8::try_from(hour_value)
        .ok()
        .filter(|h| *h <= 23)
        .ok_or_else(|| invalid(row, Column::Hour, hour, "must be within 0..=23"))?;

    Ok(Record::new(
        transaction_id,
        transaction_qty,
        unit_price,
        to_label(row, Column::ProductCategory, category)?,
        to_label(row, Column::StoreLocation, location)?,
        to_label(row, Column::Month, month)?,
        to_label(row, Column::Day, day)?,
        hour_value,
    ))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one transaction per line.
/// Columns beyond the required ones (dates, product ids, …) are ignored.
pub fn read_csv<R: Read>(source: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let positions = locate_columns(&headers)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let line = result?;
        let cells = positions.map(|idx| RawValue::from_text(line.get(idx).unwrap_or("")));
        records.push(build_record(row, &cells)?);
    }

    Ok(Table::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "transaction_id": 1, "transaction_qty": 2, "unit_price": 3.0,
///     "product_category": "Coffee", "store_location": "Astoria",
///     "Month": "January", "Day": "Monday", "Hour": 7
///   }
/// ]
/// ```
pub fn read_json<R: Read>(mut source: R) -> Result<Table> {
    let mut text = String::new();
    source
        .read_to_string(&mut text)
        .map_err(|e| DataLoadError::Malformed(format!("reading JSON: {e}")))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root
        .as_array()
        .ok_or_else(|| DataLoadError::Malformed("expected top-level JSON array".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, value) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = value
            .as_object()
            .ok_or_else(|| DataLoadError::Malformed(format!("row {row} is not a JSON object")))?;

        let mut cells: [RawValue; 8] = Default::default();
        for (cell, col) in cells.iter_mut().zip(REQUIRED_COLUMNS) {
            let (_, v) = obj
                .iter()
                .find(|(k, _)| col.matches(k))
                .ok_or(DataLoadError::MissingColumn(col.name()))?;
            *cell = json_to_raw(v);
        }
        records.push(build_record(row, &cells)?);
    }

    Ok(Table::from_records(records))
}

fn json_to_raw(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::from_text(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::Text(n.to_string())
            }
        }
        JsonValue::Null => RawValue::Null,
        other => RawValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the sales columns.
///
/// Integer columns may be Int32 or Int64, prices Float32 or Float64, labels
/// Utf8 or LargeUtf8. Any other type is read through its display form, so
/// numeric text columns written by Pandas still load.
pub fn read_parquet(file: File) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Checked against the file schema so a file without row groups still fails.
    let names: Vec<&str> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    let positions = locate_columns(&names)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut row = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let columns: Vec<&ArrayRef> = positions.iter().map(|&i| batch.column(i)).collect();

        for batch_row in 0..batch.num_rows() {
            row += 1;
            let mut cells: [RawValue; 8] = Default::default();
            for (cell, col) in cells.iter_mut().zip(&columns) {
                *cell = arrow_to_raw(col, batch_row)?;
            }
            records.push(build_record(row, &cells)?);
        }
    }

    Ok(Table::from_records(records))
}

fn arrow_to_raw(col: &ArrayRef, row: usize) -> Result<RawValue> {
    if col.is_null(row) {
        return Ok(RawValue::Null);
    }
    let raw = match col.data_type() {
        DataType::Int32 => RawValue::Int(i64::from(col.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => RawValue::Int(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            RawValue::Float(f64::from(col.as_primitive::<Float32Type>().value(row)))
        }
        DataType::Float64 => RawValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => RawValue::from_text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => RawValue::from_text(col.as_string::<i64>().value(row)),
        _ => RawValue::from_text(&array_value_to_string(col.as_ref(), row)?),
    };
    Ok(raw)
}
