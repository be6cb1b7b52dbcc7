use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::error::ExportError;
use super::filter::FilteredView;
use super::model::Record;

type Result<T> = std::result::Result<T, ExportError>;

/// Column layout of every export, in `Record`'s serialization order.
///
/// The loader reads these files back; `total_sales` rides along as an extra
/// column and is re-derived on load.
pub const EXPORT_COLUMNS: [&str; 9] = [
    "transaction_id",
    "transaction_qty",
    "unit_price",
    "product_category",
    "store_location",
    "Month",
    "Day",
    "Hour",
    "total_sales",
];

/// Write the records of `view` to `path`, choosing the format by extension
/// (`.csv`, `.json`, `.parquet`/`.pq`). Returns the number of rows written.
pub fn write_view(view: &FilteredView<'_>, path: &Path) -> Result<usize> {
    let rows = write_records(view.records(), path)?;
    log::info!("Exported {rows} records to {}", path.display());
    Ok(rows)
}

/// Write any sequence of records to `path`, format chosen by extension.
pub fn write_records<'a, I>(records: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    // Reject the format before touching the filesystem.
    if !matches!(ext.as_str(), "csv" | "json" | "parquet" | "pq") {
        return Err(ExportError::UnsupportedFormat(ext));
    }

    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    match ext.as_str() {
        "csv" => write_csv(records, BufWriter::new(file)),
        "json" => write_json(records, BufWriter::new(file)),
        _ => write_parquet(records, file),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Header row first (also for an empty selection), then one line per record.
pub fn write_csv<'a, I, W>(records: I, sink: W) -> Result<usize>
where
    I: IntoIterator<Item = &'a Record>,
    W: Write,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(sink);
    writer.write_record(EXPORT_COLUMNS)?;

    let mut rows = 0;
    for rec in records {
        writer.serialize(rec)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON array, the same shape `read_json` accepts.
pub fn write_json<'a, I, W>(records: I, mut sink: W) -> Result<usize>
where
    I: IntoIterator<Item = &'a Record>,
    W: Write,
{
    let rows: Vec<&Record> = records.into_iter().collect();
    serde_json::to_writer(&mut sink, &rows)?;
    sink.flush()?;
    Ok(rows.len())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn export_schema() -> Schema {
    let types = [
        DataType::Int64,
        DataType::Int64,
        DataType::Float64,
        DataType::Utf8,
        DataType::Utf8,
        DataType::Utf8,
        DataType::Utf8,
        DataType::Int64,
        DataType::Float64,
    ];
    Schema::new(
        EXPORT_COLUMNS
            .iter()
            .zip(types)
            .map(|(name, ty)| Field::new(*name, ty, false))
            .collect::<Vec<_>>(),
    )
}

/// Single row group holding every record.
pub fn write_parquet<'a, I, W>(records: I, sink: W) -> Result<usize>
where
    I: IntoIterator<Item = &'a Record>,
    W: Write + Send,
{
    let records: Vec<&Record> = records.into_iter().collect();

    let ints = |f: fn(&Record) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| f(r))))
    };
    let floats = |f: fn(&Record) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| f(r))))
    };
    let strings = |f: fn(&Record) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| f(r))))
    };

    let schema = Arc::new(export_schema());
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            ints(|r| r.transaction_id),
            ints(|r| i64::from(r.transaction_qty)),
            floats(|r| r.unit_price),
            strings(|r| r.product_category.as_str()),
            strings(|r| r.store_location.as_str()),
            strings(|r| r.month.as_str()),
            strings(|r| r.day.as_str()),
            ints(|r| i64::from(r.hour)),
            floats(Record::total_sales),
        ],
    )?;

    let mut writer = ArrowWriter::try_new(sink, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(records.len())
}
