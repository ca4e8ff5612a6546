//! Infer JSON Table Schemas from CSV files and convert CKAN dataset metadata
//! into Tabular Data Format (Data Package) metadata.

pub mod config;
pub mod error;
pub mod extent;
pub mod package;
pub mod process;
pub mod schema;
pub mod tdf;

pub use error::{Error, Result};
pub use extent::{parse_column_index, temporal_extent, temporal_extent_from_reader};
pub use schema::{infer_schema, infer_schema_from_reader, Field, FieldType, TableSchema};
pub use tdf::{convert_dataset_attributes, Attributes};
