use super::utils::{clean_str, is_missing};

/// A CSV file held as text: trimmed, de-duplicated header names plus every data
/// row padded to the header width.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names, from the header row.
    pub headers: Vec<String>,
    /// One `Vec` per data row, always `headers.len()` cells long.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cleaned cells of column `idx`, `None` where the cell is missing.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = Option<String>> + '_ {
        self.rows.iter().map(move |row| {
            let cell = clean_str(row.get(idx).map(String::as_str).unwrap_or(""));
            if is_missing(&cell) {
                None
            } else {
                Some(cell)
            }
        })
    }
}
