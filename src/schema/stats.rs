use arrow::{
    array::{Array, BooleanArray, Float64Array, Int64Array},
    compute,
    datatypes::DataType,
};

use super::types::{BooleanSummary, NumericSummary, Statistics};

/// Summarize a typed column. Numeric columns get the count / mean / std /
/// quartile summary, boolean columns a count / unique / top / freq summary;
/// any other storage type, and any column without values, gets nothing.
pub fn describe(array: &dyn Array) -> Option<Statistics> {
    match array.data_type() {
        DataType::Int64 => {
            let arr = array.as_any().downcast_ref::<Int64Array>()?;
            let min = compute::min(arr)? as f64;
            let max = compute::max(arr)? as f64;
            let values = arr.iter().flatten().map(|v| v as f64).collect();
            numeric_summary(values, min, max).map(Statistics::Numeric)
        }
        DataType::Float64 => {
            let arr = array.as_any().downcast_ref::<Float64Array>()?;
            let min = compute::min(arr)?;
            let max = compute::max(arr)?;
            let values = arr.iter().flatten().collect();
            numeric_summary(values, min, max).map(Statistics::Numeric)
        }
        DataType::Boolean => {
            let arr = array.as_any().downcast_ref::<BooleanArray>()?;
            boolean_summary(arr).map(Statistics::Boolean)
        }
        _ => None,
    }
}

fn numeric_summary(mut values: Vec<f64>, min: f64, max: f64) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sq / (n - 1) as f64).sqrt()
    });

    values.sort_by(f64::total_cmp);
    Some(NumericSummary {
        count: n,
        mean,
        std,
        min,
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.50),
        p75: quantile(&values, 0.75),
        max,
    })
}

/// Linear interpolation between the closest ranks of sorted `values`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn boolean_summary(arr: &BooleanArray) -> Option<BooleanSummary> {
    let trues = arr.true_count();
    let falses = arr.false_count();
    let count = trues + falses;
    if count == 0 {
        return None;
    }

    // ties go to whichever value shows up first
    let top = match trues.cmp(&falses) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => arr.iter().flatten().next().unwrap_or(true),
    };

    Some(BooleanSummary {
        count,
        unique: usize::from(trues > 0) + usize::from(falses > 0),
        top,
        freq: trues.max(falses),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;

    fn numeric(stats: Option<Statistics>) -> NumericSummary {
        match stats {
            Some(Statistics::Numeric(s)) => s,
            other => panic!("expected numeric summary, got {:?}", other),
        }
    }

    #[test]
    fn test_describe_integers() {
        let arr = Int64Array::from(vec![Some(1), Some(2), None, Some(3), Some(4)]);
        let s = numeric(describe(&arr));
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.p25, 1.75);
        assert_eq!(s.p50, 2.5);
        assert_eq!(s.p75, 3.25);
        let std = s.std.expect("std over four values");
        assert!((std - 1.2909944487358056).abs() < 1e-12);
    }

    #[test]
    fn test_describe_single_float() {
        let arr = Float64Array::from(vec![None, Some(2.5)]);
        let s = numeric(describe(&arr));
        assert_eq!(s.count, 1);
        assert_eq!(s.std, None);
        assert_eq!(s.p25, 2.5);
        assert_eq!(s.p75, 2.5);
    }

    #[test]
    fn test_describe_booleans() {
        let arr = BooleanArray::from(vec![Some(false), Some(true), None, Some(true)]);
        let expected = BooleanSummary {
            count: 3,
            unique: 2,
            top: true,
            freq: 2,
        };
        assert_eq!(describe(&arr), Some(Statistics::Boolean(expected)));

        let tie = BooleanArray::from(vec![false, true]);
        match describe(&tie) {
            Some(Statistics::Boolean(s)) => assert!(!s.top),
            other => panic!("expected boolean summary, got {:?}", other),
        }
    }

    #[test]
    fn test_describe_skips_strings_and_empty_columns() {
        assert_eq!(describe(&StringArray::from(vec!["a", "b"])), None);
        assert_eq!(describe(&Int64Array::from(vec![None, None])), None);
        assert_eq!(describe(&BooleanArray::from(Vec::<bool>::new())), None);
    }
}
