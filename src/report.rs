use std::fmt::Display;
use std::io::{self, Write};

use crate::data::aggregate::{AggregateBundle, Aggregates, Comparison};
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Plain-text dashboard
// ---------------------------------------------------------------------------

/// Write the KPI block, filter summary and every chart series as text.
pub fn render<W: Write>(state: &DashboardState, out: &mut W) -> io::Result<()> {
    writeln!(out, "Coffee Shop Sales Analytics")?;
    writeln!(out, "===========================")?;

    if let Some(warning) = state.validation_warning() {
        writeln!(out, "! {warning}")?;
    }

    let summary = state.summary();
    writeln!(out)?;
    writeln!(out, "Filter Summary")?;
    writeln!(out, "  Selected Months:     {}", summary.months)?;
    writeln!(out, "  Selected Categories: {}", summary.categories)?;
    writeln!(out, "  Selected Locations:  {}", summary.locations)?;
    writeln!(out, "  Filtered Rows:       {}", format_count(summary.filtered_rows))?;

    match state.bundle() {
        AggregateBundle::NoData => {
            writeln!(out)?;
            writeln!(
                out,
                "No data available for the selected filters. Please adjust your selection."
            )?;
        }
        AggregateBundle::Computed {
            filtered,
            comparison,
            ..
        } => {
            render_kpis(filtered, comparison, out)?;
            render_series(filtered, out)?;
        }
    }
    Ok(())
}

fn render_kpis<W: Write>(agg: &Aggregates, cmp: &Comparison, out: &mut W) -> io::Result<()> {
    let same_or_changed = |changed: bool| if changed { "Changed" } else { "Same as overall" };

    writeln!(out)?;
    writeln!(
        out,
        "Total Revenue       {:>14}   {} vs total",
        format_currency(agg.total_sales),
        cmp.total_sales_change
    )?;
    writeln!(
        out,
        "Total Transactions  {:>14}   {} vs total",
        format_count(agg.transactions),
        cmp.transactions_change
    )?;
    writeln!(
        out,
        "Top Category        {:>14}   {}",
        agg.top_category,
        same_or_changed(agg.top_category != cmp.overall_top_category)
    )?;
    writeln!(
        out,
        "Peak Hour           {:>14}   {}",
        format!("{}:00", agg.peak_hour),
        same_or_changed(agg.peak_hour != cmp.overall_peak_hour)
    )
}

fn render_series<W: Write>(agg: &Aggregates, out: &mut W) -> io::Result<()> {
    let hourly: Vec<(String, Option<f64>)> = agg
        .by_hour
        .sums()
        .into_iter()
        .map(|(h, v)| (format!("{h}:00"), Some(v)))
        .collect();
    section(out, "Hourly Sales Trend", hourly)?;
    section(out, "Daily Sales Distribution", agg.daily_sales())?;
    section(out, "Monthly Sales Distribution", agg.monthly_sales())?;
    section(out, "Sales by Category", present(agg.by_category.sums_by_value()))?;
    section(out, "Top 5 Product Categories", present(agg.by_category.top_n(5)))?;

    let avg_hourly: Vec<(String, Option<f64>)> = agg
        .by_hour
        .means()
        .into_iter()
        .map(|(h, v)| (format!("{h}:00"), Some(v)))
        .collect();
    section(out, "Average Sales by Hour", avg_hourly)?;
    section(out, "Average Sales by Day", agg.daily_average())?;
    section(out, "Average Sales by Category", present(agg.by_category.means_by_value()))?;
    section(out, "Sales by Store Location", present(agg.by_location.sums_by_value()))
}

fn present<K: Display>(series: Vec<(&K, f64)>) -> Vec<(String, Option<f64>)> {
    series
        .into_iter()
        .map(|(k, v)| (k.to_string(), Some(v)))
        .collect()
}

fn section<W, L>(out: &mut W, title: &str, series: Vec<(L, Option<f64>)>) -> io::Result<()>
where
    W: Write,
    L: Display,
{
    writeln!(out)?;
    writeln!(out, "{title}")?;
    for (label, value) in series {
        let value = value.map_or_else(|| "-".to_string(), format_currency);
        writeln!(out, "  {:<24} {:>14}", label.to_string(), value)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `1234567.891` → `$1,234,567.89`
pub fn format_currency(value: f64) -> String {
    let cents = format!("{:.2}", value.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if value < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${}.{frac}", group_thousands(whole))
}

/// `1234567` → `1,234,567`
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
