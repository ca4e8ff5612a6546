use arrow::datatypes::DataType;
use tracing::debug;

use crate::process::RawTable;

/// Storage type for every column of `table`, in column order.
pub fn derive_storage_types(table: &RawTable) -> Vec<DataType> {
    (0..table.num_columns())
        .map(|idx| {
            let has_missing = table.column(idx).any(|cell| cell.is_none());
            let ty = widen_for_missing(classify(table.column(idx).flatten()), has_missing);
            debug!(column = %table.headers[idx], ?ty, has_missing, "derived storage type");
            ty
        })
        .collect()
}

/// Integer and boolean storage has no missing marker: a column with gaps is
/// stored as Float64 or Utf8 instead.
pub fn widen_for_missing(ty: DataType, has_missing: bool) -> DataType {
    match ty {
        DataType::Int64 if has_missing => DataType::Float64,
        DataType::Boolean if has_missing => DataType::Utf8,
        other => other,
    }
}

/// Pick the narrowest storage type every non-missing value fits:
///  - all `i64`                       → Int64
///  - all finite `f64`                → Float64
///  - all `true`/`false` (any case)   → Boolean
///  - anything else, or no values     → Utf8
pub fn classify<I, S>(values: I) -> DataType
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = false;
    let mut integer = true;
    let mut float = true;
    let mut boolean = true;

    for v in values {
        let v = v.as_ref();
        seen = true;
        integer = integer && v.parse::<i64>().is_ok();
        float = float && v.parse::<f64>().map_or(false, f64::is_finite);
        boolean = boolean && parse_bool(v).is_some();
        if !integer && !float && !boolean {
            return DataType::Utf8;
        }
    }

    match (seen, integer, float, boolean) {
        (false, ..) => DataType::Utf8,
        (true, true, _, _) => DataType::Int64,
        (true, false, true, _) => DataType::Float64,
        (true, false, false, true) => DataType::Boolean,
        _ => DataType::Utf8,
    }
}

/// `true`/`false` in any letter case.
pub fn parse_bool(v: &str) -> Option<bool> {
    if v.eq_ignore_ascii_case("true") {
        Some(true)
    } else if v.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(["1", "-2", "+30"]), DataType::Int64);
        assert_eq!(classify(["1", "2.5", "1e3"]), DataType::Float64);
        assert_eq!(classify(["true", "False", "TRUE"]), DataType::Boolean);
        assert_eq!(classify(["1", "x"]), DataType::Utf8);
        assert_eq!(classify(["true", "1"]), DataType::Utf8);
        assert_eq!(classify(["2014-01-01", "2015-01-01"]), DataType::Utf8);
        assert_eq!(classify(["1.5", "inf"]), DataType::Utf8);
        assert_eq!(classify(Vec::<String>::new()), DataType::Utf8);
    }

    #[test]
    fn test_missing_cells_widen_storage() {
        let table = RawTable {
            headers: vec!["n".into(), "b".into(), "f".into(), "full".into()],
            rows: vec![
                vec!["1".into(), "true".into(), "1.5".into(), "7".into()],
                vec!["".into(), "NA".into(), "".into(), "8".into()],
                vec!["3".into(), "false".into(), "2".into(), "9".into()],
            ],
        };
        assert_eq!(
            derive_storage_types(&table),
            vec![
                DataType::Float64,
                DataType::Utf8,
                DataType::Float64,
                DataType::Int64
            ]
        );
        assert_eq!(widen_for_missing(DataType::Utf8, true), DataType::Utf8);
        assert_eq!(widen_for_missing(DataType::Boolean, false), DataType::Boolean);
    }
}
