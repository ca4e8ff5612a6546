use arrow::record_batch::RecordBatch;
use std::{io::Read, path::Path};
use tracing::{debug, info, instrument};

use super::arrow::{build_record_batch, field_type_for};
use super::derive::derive_storage_types;
use super::stats::describe;
use super::types::{Field, TableSchema};
use crate::error::Result;
use crate::process::{load_csv, open_csv, RawTable};

/// A schema together with the typed columns it was inferred from.
#[derive(Debug, Clone)]
pub struct InferredTable {
    pub schema: TableSchema,
    pub batch: RecordBatch,
}

/// Infer a JSON Table Schema for the CSV file at `path`.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn infer_schema<P: AsRef<Path>>(path: P) -> Result<TableSchema> {
    let schema = infer_from_raw(&open_csv(path)?)?.schema;
    info!(fields = schema.fields.len(), "inferred schema");
    Ok(schema)
}

/// Infer a JSON Table Schema from an already-open CSV stream.
pub fn infer_schema_from_reader<R: Read>(reader: R) -> Result<TableSchema> {
    infer_table(reader).map(|t| t.schema)
}

/// Load a CSV stream and infer its schema, keeping the typed columns.
pub fn infer_table<R: Read>(reader: R) -> Result<InferredTable> {
    let table = load_csv(reader)?;
    infer_from_raw(&table)
}

/// Classify each column, materialize it with that storage type, then
/// summarize only the columns whose type carries statistics.
pub fn infer_from_raw(table: &RawTable) -> Result<InferredTable> {
    let types = derive_storage_types(table);
    let batch = build_record_batch(table, &types)?;

    let fields = table
        .headers
        .iter()
        .zip(&types)
        .enumerate()
        .map(|(index, (name, dt))| {
            let field = Field {
                index,
                name: name.clone(),
                ty: field_type_for(dt),
                stats: describe(batch.column(index).as_ref()),
            };
            debug!(index, name = %field.name, ty = ?field.ty, "field");
            field
        })
        .collect();

    Ok(InferredTable {
        schema: TableSchema { fields },
        batch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, Statistics};
    use std::io::Cursor;

    fn schema_of(csv: &str) -> TableSchema {
        infer_schema_from_reader(Cursor::new(csv.to_string())).unwrap()
    }

    #[test]
    fn test_indexes_follow_column_order() {
        let schema = schema_of("a,b,c,d\n1,x,true,2.5\n");
        let idx: Vec<usize> = schema.fields.iter().map(|f| f.index).collect();
        let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_types() {
        let schema = schema_of("int,num,flag,text,mixed\n1,1.5,true,a,1\n2,2,false,b,x\n");
        let types: Vec<FieldType> = schema.fields.iter().map(|f| f.ty).collect();
        assert_eq!(
            types,
            vec![
                FieldType::Integer,
                FieldType::Number,
                FieldType::Boolean,
                FieldType::String,
                FieldType::String,
            ]
        );
        assert!(schema.field("text").unwrap().stats.is_none());
        assert!(schema.field("mixed").unwrap().stats.is_none());
        assert!(matches!(
            schema.field("flag").unwrap().stats,
            Some(Statistics::Boolean(_))
        ));
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let schema = schema_of("n\n1\n\nNA\n3\n");
        let field = &schema.fields[0];
        assert_eq!(field.ty, FieldType::Number);
        match &field.stats {
            Some(Statistics::Numeric(s)) => {
                assert_eq!(s.count, 2);
                assert_eq!(s.mean, 2.0);
            }
            other => panic!("expected numeric summary, got {:?}", other),
        }
    }

    #[test]
    fn test_gaps_widen_integer_and_boolean_columns() {
        let schema = schema_of("n,b\n1,true\n,\n3,false\n");
        let types: Vec<FieldType> = schema.fields.iter().map(|f| f.ty).collect();
        assert_eq!(types, vec![FieldType::Number, FieldType::String]);
        assert!(matches!(
            schema.fields[0].stats,
            Some(Statistics::Numeric(ref s)) if s.count == 2
        ));
        assert!(schema.fields[1].stats.is_none());
    }

    #[test]
    fn test_literal_quotes_are_kept() {
        let schema = schema_of("q,n\n\"\"\"5\"\"\",\"5\"\n\"\"\"6\"\"\",\"6\"\n");
        let types: Vec<FieldType> = schema.fields.iter().map(|f| f.ty).collect();
        assert_eq!(types, vec![FieldType::String, FieldType::Integer]);
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(schema_of("").fields.is_empty());

        let schema = schema_of("a,b\n");
        assert_eq!(schema.fields.len(), 2);
        assert!(schema
            .fields
            .iter()
            .all(|f| f.ty == FieldType::String && f.stats.is_none()));
    }

    #[test]
    fn test_batch_matches_schema() {
        let inferred = infer_table(Cursor::new("a,b\n1,x\n2,y\n")).unwrap();
        assert_eq!(inferred.batch.num_rows(), 2);
        assert_eq!(inferred.batch.num_columns(), inferred.schema.fields.len());
    }
}
