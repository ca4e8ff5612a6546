// src/schema/arrow.rs

use arrow::{
    array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder},
    datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

use super::derive::parse_bool;
use super::types::FieldType;
use crate::error::Result;
use crate::process::RawTable;

/// Map an Arrow storage type onto a JSON Table Schema type.
///
/// - Int8..Int64, UInt8..UInt64 → integer
/// - Float16..Float64, Decimal*  → number
/// - Boolean                     → boolean
/// - fallback (Utf8, dates, ...) → string
pub fn field_type_for(dt: &DataType) -> FieldType {
    match dt {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => FieldType::Integer,
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(..)
        | DataType::Decimal256(..) => FieldType::Number,
        DataType::Boolean => FieldType::Boolean,
        _ => FieldType::String,
    }
}

/// Materialize one column of cleaned cells (`None` = missing) as `dt`.
/// Cells that do not parse as `dt` become nulls.
pub fn build_column<I>(values: I, dt: &DataType) -> ArrayRef
where
    I: IntoIterator<Item = Option<String>>,
{
    match dt {
        DataType::Int64 => {
            let mut b = Int64Builder::new();
            for opt in values {
                b.append_option(opt.and_then(|s| s.parse().ok()));
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::new();
            for opt in values {
                b.append_option(opt.and_then(|s| s.parse().ok()));
            }
            Arc::new(b.finish())
        }
        DataType::Boolean => {
            let mut b = BooleanBuilder::new();
            for opt in values {
                b.append_option(opt.as_deref().and_then(parse_bool));
            }
            Arc::new(b.finish())
        }
        _ => {
            let mut b = StringBuilder::new();
            for opt in values {
                b.append_option(opt);
            }
            Arc::new(b.finish())
        }
    }
}

/// Build a typed `RecordBatch` from `table`, one column per entry of `types`.
pub fn build_record_batch(table: &RawTable, types: &[DataType]) -> Result<RecordBatch> {
    let fields: Vec<ArrowField> = table
        .headers
        .iter()
        .zip(types)
        .map(|(name, dt)| ArrowField::new(name, dt.clone(), /* nullable = */ true))
        .collect();

    let columns: Vec<ArrayRef> = types
        .iter()
        .enumerate()
        .map(|(idx, dt)| build_column(table.column(idx), dt))
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    let batch =
        RecordBatch::try_new_with_options(Arc::new(ArrowSchema::new(fields)), columns, &options)?;
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array};
    use std::io::Cursor;

    #[test]
    fn test_field_type_for() {
        assert_eq!(field_type_for(&DataType::Int64), FieldType::Integer);
        assert_eq!(field_type_for(&DataType::Float64), FieldType::Number);
        assert_eq!(field_type_for(&DataType::Boolean), FieldType::Boolean);
        assert_eq!(field_type_for(&DataType::Utf8), FieldType::String);
        assert_eq!(field_type_for(&DataType::Date32), FieldType::String);
    }

    #[test]
    fn test_build_record_batch() -> anyhow::Result<()> {
        let table = crate::process::load_csv(Cursor::new("a,b\n1,x\n,y\n3,\n"))?;
        let batch = build_record_batch(&table, &[DataType::Int64, DataType::Utf8])?;
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 2);

        let a = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("column a is Int64");
        assert_eq!(a.null_count(), 1);
        assert_eq!(a.value(2), 3);
        assert_eq!(batch.column(1).null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_build_record_batch_without_columns() -> anyhow::Result<()> {
        let batch = build_record_batch(&RawTable::default(), &[])?;
        assert_eq!(batch.num_columns(), 0);
        assert_eq!(batch.num_rows(), 0);
        Ok(())
    }
}
