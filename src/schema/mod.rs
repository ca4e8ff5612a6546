pub mod arrow;
pub mod derive;
pub mod infer;
pub mod stats;
pub mod types;

pub use self::arrow::{build_record_batch, field_type_for};
pub use infer::{infer_from_raw, infer_schema, infer_schema_from_reader, infer_table, InferredTable};
pub use types::{BooleanSummary, Field, FieldType, NumericSummary, Statistics, TableSchema};
