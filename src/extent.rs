use std::{cmp::Ordering, io::Read, path::Path};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::process::{
    date_parser::{parse_datetime, Moment},
    load_csv, open_csv, RawTable,
};

/// Temporal extent of column `column_num` (zero-based) of the CSV at `path`,
/// as an ISO 8601 interval `START/END`, e.g.
/// `2014-02-26T21:22:45/2015-04-26T20:19:32`.
///
/// Offsets carried by the dates are kept in the output.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn temporal_extent<P: AsRef<Path>>(path: P, column_num: usize) -> Result<String> {
    let table = open_csv(path)?;
    let (min, max) = column_extent(&table, column_num)?;
    Ok(format_interval(&min, &max))
}

/// [`temporal_extent`] over an already-open CSV stream.
pub fn temporal_extent_from_reader<R: Read>(reader: R, column_num: usize) -> Result<String> {
    let table = load_csv(reader)?;
    let (min, max) = column_extent(&table, column_num)?;
    Ok(format_interval(&min, &max))
}

fn format_interval(min: &Moment, max: &Moment) -> String {
    format!("{}/{}", min.to_iso8601(), max.to_iso8601())
}

/// Earliest and latest date of one column. Missing cells are skipped; every
/// other cell must parse as a date, and all of them must agree on carrying a
/// UTC offset or not.
pub fn column_extent(table: &RawTable, column_num: usize) -> Result<(Moment, Moment)> {
    if column_num >= table.num_columns() {
        return Err(Error::ColumnOutOfRange {
            index: column_num,
            columns: table.num_columns(),
        });
    }

    let mut bounds: Option<(Moment, Moment)> = None;
    for cell in table.column(column_num).flatten() {
        let moment = parse_datetime(&cell)?;
        bounds = Some(match bounds {
            None => (moment, moment),
            Some((lo, hi)) => {
                let below = moment
                    .try_cmp(&lo)
                    .ok_or(Error::MixedTimezones { column: column_num })?;
                let above = moment
                    .try_cmp(&hi)
                    .ok_or(Error::MixedTimezones { column: column_num })?;
                (
                    if below == Ordering::Less { moment } else { lo },
                    if above == Ordering::Greater { moment } else { hi },
                )
            }
        });
    }

    let (lo, hi) = bounds.ok_or(Error::NoDates { column: column_num })?;
    debug!(column = column_num, min = %lo.to_iso8601(), max = %hi.to_iso8601(), "extent");
    Ok((lo, hi))
}

/// Turn a user-supplied column number into an index.
pub fn parse_column_index(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidColumnIndex(raw.to_string()))
}
