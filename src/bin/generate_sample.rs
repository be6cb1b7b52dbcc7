use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rusty_barista::data::export::write_records;
use rusty_barista::data::{Record, DAY_ORDER, MONTH_ORDER};

const DAYS_IN_MONTH: [u32; 6] = [31, 28, 31, 30, 31, 30];

const LOCATIONS: [&str; 3] = ["Astoria", "Hell's Kitchen", "Lower Manhattan"];

/// (category, min price, max price, relative weight)
const CATEGORIES: [(&str, f64, f64, u32); 6] = [
    ("Coffee", 2.0, 4.75, 38),
    ("Tea", 2.5, 4.0, 28),
    ("Bakery", 2.5, 4.5, 15),
    ("Drinking Chocolate", 3.0, 4.75, 7),
    ("Flavours", 0.8, 0.8, 4),
    ("Coffee beans", 10.0, 28.0, 8),
];

/// Opening hours 6:00–20:00, busiest mid-morning.
const HOUR_WEIGHTS: [(u8, u32); 15] = [
    (6, 4), (7, 12), (8, 16), (9, 16), (10, 17), (11, 8), (12, 7), (13, 7),
    (14, 7), (15, 7), (16, 7), (17, 7), (18, 6), (19, 5), (20, 1),
];

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, n: u32) -> u32 {
        (self.next_u64() % u64::from(n)) as u32
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn weighted<'a, T>(&mut self, items: &'a [T], weight: impl Fn(&T) -> u32) -> &'a T {
        let total: u32 = items.iter().map(&weight).sum();
        let mut pick = self.below(total);
        for item in items {
            let w = weight(item);
            if pick < w {
                return item;
            }
            pick -= w;
        }
        &items[items.len() - 1]
    }
}

/// Month and weekday names for a day offset into 2023 (1 January was a Sunday).
fn calendar(day_of_year: u32) -> (&'static str, &'static str) {
    let mut remaining = day_of_year;
    let mut month = MONTH_ORDER[MONTH_ORDER.len() - 1];
    for (name, days) in MONTH_ORDER.iter().zip(DAYS_IN_MONTH) {
        if remaining < days {
            month = *name;
            break;
        }
        remaining -= days;
    }
    let weekday = DAY_ORDER[((day_of_year + 6) % 7) as usize];
    (month, weekday)
}

fn generate(rows: usize, seed: u64) -> Vec<Record> {
    let mut rng = SimpleRng::new(seed);
    let days_in_range: u32 = DAYS_IN_MONTH.iter().sum();

    // Sorted by day so transaction ids increase with time like the real export.
    let mut days: Vec<u32> = (0..rows).map(|_| rng.below(days_in_range)).collect();
    days.sort_unstable();

    days.into_iter()
        .enumerate()
        .map(|(i, day)| {
            let (month, weekday) = calendar(day);
            let &(category, lo, hi, _) = rng.weighted(&CATEGORIES, |c| c.3);
            let &(hour, _) = rng.weighted(&HOUR_WEIGHTS, |h| h.1);
            let location = LOCATIONS[rng.below(LOCATIONS.len() as u32) as usize];
            let qty = if rng.below(10) < 7 { 1 } else { 2 + rng.below(2) };
            // Prices move in 5-cent steps.
            let price = ((lo + (hi - lo) * rng.next_f64()) * 20.0).round() / 20.0;

            Record::new(
                i as i64 + 1,
                qty,
                price,
                category,
                location,
                month,
                weekday,
                hour,
            )
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let mut output = PathBuf::from("coffee_shop_sales.csv");
    let mut rows = 10_000usize;
    let mut seed = 42u64;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--rows" => {
                rows = args
                    .next()
                    .context("missing value for --rows")?
                    .parse()
                    .context("--rows must be a number")?;
            }
            "--seed" => {
                seed = args
                    .next()
                    .context("missing value for --seed")?
                    .parse()
                    .context("--seed must be a number")?;
            }
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'"),
            path => output = PathBuf::from(path),
        }
    }

    let records = generate(rows, seed);
    write_records(&records, &output)
        .with_context(|| format!("writing {}", output.display()))?;

    log::info!("Generated {} transactions with seed {seed}", records.len());
    println!("Wrote {} transactions to {}", records.len(), output.display());
    Ok(())
}
