use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use rusty_barista::{load_file, report, write_view, DashboardState, FilterDimension};

const USAGE: &str = "\
usage: rusty-barista <DATA_FILE> [--month M]... [--category C]... [--location L]...
                     [--export FILE]

Loads a coffee-shop sales file (.csv, .json or .parquet) and prints the
dashboard for the selected months, categories and locations. A dimension
with no flags keeps every option selected. --export also writes the filtered
rows to FILE (.csv, .json or .parquet).";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CliOptions {
    data_path: Option<PathBuf>,
    months: BTreeSet<String>,
    categories: BTreeSet<String>,
    locations: BTreeSet<String>,
    export_path: Option<PathBuf>,
    show_help: bool,
}

impl CliOptions {
    fn selection(&self, dimension: FilterDimension) -> &BTreeSet<String> {
        match dimension {
            FilterDimension::Month => &self.months,
            FilterDimension::Category => &self.categories,
            FilterDimension::Location => &self.locations,
        }
    }
}

fn main() {
    env_logger::init();

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let exit_code = run(std::env::args_os(), &mut stdout, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run<I, W, E>(args: I, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let options = match parse_args(args) {
        Ok(options) => options,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            let _ = writeln!(err, "{USAGE}");
            return 2;
        }
    };

    if options.show_help {
        return if writeln!(out, "{USAGE}").is_ok() { 0 } else { 1 };
    }

    match render_dashboard(&options, out) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{e:#}");
            let _ = writeln!(err, "error: {e:#}");
            1
        }
    }
}

fn render_dashboard<W: Write>(options: &CliOptions, out: &mut W) -> anyhow::Result<()> {
    let path = options
        .data_path
        .as_deref()
        .context("no data file given")?;
    let table = load_file(path).with_context(|| format!("loading {}", path.display()))?;

    let mut state = DashboardState::new(Arc::new(table));
    for dim in FilterDimension::ALL {
        let selection = options.selection(dim);
        if selection.is_empty() {
            continue;
        }
        for unknown in selection.difference(state.table().options(dim)) {
            log::warn!("'{unknown}' is not among the {dim} in {}", path.display());
        }
        state.set_selection(dim, selection.clone());
    }

    report::render(&state, out).context("writing report")?;

    if let Some(export_path) = &options.export_path {
        let rows = write_view(&state.view(), export_path)
            .with_context(|| format!("exporting to {}", export_path.display()))?;
        writeln!(out, "\nExported {rows} rows to {}", export_path.display())
            .context("writing report")?;
    }
    Ok(())
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        let arg = arg
            .into_string()
            .map_err(|raw| format!("argument is not valid UTF-8: {raw:?}"))?;

        let target = match arg.as_str() {
            "-h" | "--help" => {
                options.show_help = true;
                continue;
            }
            "--month" => &mut options.months,
            "--category" => &mut options.categories,
            "--location" => &mut options.locations,
            "--export" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for '{arg}'"))?;
                options.export_path = Some(PathBuf::from(value));
                continue;
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option '{flag}'")),
            _ => {
                if options.data_path.is_some() {
                    return Err(format!("unexpected extra argument '{arg}'"));
                }
                options.data_path = Some(PathBuf::from(&arg));
                continue;
            }
        };

        let value = args
            .next()
            .and_then(|v| v.into_string().ok())
            .ok_or_else(|| format!("missing value for '{arg}'"))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("empty value for '{arg}'"));
        }
        target.insert(value.to_string());
    }

    if options.data_path.is_none() && !options.show_help {
        return Err("missing DATA_FILE".to_string());
    }
    Ok(options)
}
