//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rusty_barista::{Record, Table};

pub const CSV_HEADER: &str = "transaction_id,transaction_date,transaction_time,transaction_qty,\
                              store_id,store_location,product_id,unit_price,product_category,\
                              product_type,Month,Day,Hour";

/// A small table spanning three months, three categories and two locations.
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new(1, 2, 3.00, "Coffee", "Astoria", "January", "Monday", 7),
        Record::new(2, 1, 3.10, "Tea", "Astoria", "January", "Monday", 7),
        Record::new(3, 1, 2.25, "Bakery", "Lower Manhattan", "January", "Tuesday", 8),
        Record::new(4, 3, 2.50, "Coffee", "Lower Manhattan", "February", "Wednesday", 9),
        Record::new(4, 1, 3.75, "Bakery", "Lower Manhattan", "February", "Wednesday", 9),
        Record::new(5, 2, 2.55, "Tea", "Astoria", "February", "Saturday", 10),
        Record::new(6, 1, 4.75, "Coffee", "Astoria", "March", "Sunday", 10),
        Record::new(7, 2, 3.00, "Tea", "Lower Manhattan", "March", "Friday", 15),
        Record::new(8, 1, 3.50, "Bakery", "Astoria", "March", "Thursday", 19),
    ]
}

pub fn sample_table() -> Table {
    Table::from_records(sample_records())
}

pub fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Every subset of `options`, including the empty one.
pub fn subsets(options: &BTreeSet<String>) -> Vec<BTreeSet<String>> {
    let items: Vec<&String> = options.iter().collect();
    (0..1u32 << items.len())
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << *i) != 0)
                .map(|(_, v)| (*v).clone())
                .collect()
        })
        .collect()
}

/// One CSV line in the source export's column layout.
pub fn csv_line(rec: &Record) -> String {
    format!(
        "{},2023-01-01,07:06:11,{},5,{},32,{},{},Gourmet brewed coffee,{},{},{}",
        rec.transaction_id,
        rec.transaction_qty,
        rec.store_location,
        rec.unit_price,
        rec.product_category,
        rec.month,
        rec.day,
        rec.hour
    )
}

/// Write `records` as a CSV file named `name` under `dir`.
pub fn write_csv(dir: &Path, name: &str, records: &[Record]) -> PathBuf {
    let mut text = String::from(CSV_HEADER);
    for rec in records {
        text.push('\n');
        text.push_str(&csv_line(rec));
    }
    let path = dir.join(name);
    std::fs::write(&path, text).expect("Failed to write CSV fixture");
    path
}
