// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// JSON Table Schema type of a column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Number,
    Boolean,
    String,
}

/// One column of a table schema: position, header text, type and, for
/// numeric and boolean columns, a summary of the values.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Field {
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(flatten)]
    pub stats: Option<Statistics>,
}

/// Summary statistics, flattened into the owning [`Field`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum Statistics {
    Numeric(NumericSummary),
    Boolean(BooleanSummary),
}

/// count / mean / std / min / quartiles / max over the non-missing values.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

/// count / distinct values / most frequent value and its frequency.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BooleanSummary {
    pub count: usize,
    pub unique: usize,
    pub top: bool,
    pub freq: usize,
}

/// The inferred schema of a whole table, fields in file column order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct TableSchema {
    pub fields: Vec<Field>,
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
