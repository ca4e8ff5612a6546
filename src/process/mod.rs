// src/process/mod.rs
use csv::{ReaderBuilder, StringRecord};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub mod date_parser;
pub mod raw_table;
pub mod utils;

pub use raw_table::RawTable;

/// Open the CSV at `path` and load it with [`load_csv`].
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn open_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(path.as_ref())?;
    load_csv(BufReader::new(file))
}

/// Read comma-separated text whose first record is the header row.
///
/// - Header names are trimmed; blank ones become `Unnamed: <idx>` and repeats
///   are renamed `name.1`, `name.2`, ...
/// - Rows shorter than the header are padded with empty (missing) cells.
/// - A row longer than the header is an error.
/// - An empty input yields a table with no columns.
pub fn load_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = dedupe_headers(rdr.headers()?);
    let width = headers.len();

    let mut rows = Vec::new();
    let mut padded = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() > width {
            return Err(Error::RowTooLong {
                row: idx + 1,
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() < width {
            padded += 1;
            row.resize(width, String::new());
        }
        rows.push(row);
    }

    if padded > 0 {
        warn!(padded, width, "short rows padded with missing cells");
    }
    debug!(columns = width, rows = rows.len(), "loaded csv");

    Ok(RawTable { headers, rows })
}

fn dedupe_headers(record: &StringRecord) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(record.len());

    for (idx, raw) in record.iter().enumerate() {
        let mut name = utils::header_name(raw, idx);
        let mut seen = counts.get(&name).copied().unwrap_or(0);
        while seen > 0 {
            counts.insert(name.clone(), seen + 1);
            name = format!("{}.{}", name, seen);
            seen = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.clone(), 1);
        names.push(name);
    }

    names
}
