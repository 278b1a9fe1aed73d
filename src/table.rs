// In-memory table: a header row plus text cells. Empty cells are missing values.
use crate::etl::RenameMapping;
use crate::{MergeError, MergeResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) -> MergeResult<()> {
        if row.len() != self.columns.len() {
            return Err(MergeError::Schema(format!(
                "row has {} fields but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn value(&self, row: usize, label: &str) -> Option<&str> {
        let idx = self.column_index(label)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    pub fn column_values(&self, label: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(label)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    // Relabels every column whose label is a key of `mapping`. Cells and
    // column positions are untouched. Returns how many labels changed.
    pub fn rename_columns(&mut self, mapping: &RenameMapping) -> usize {
        let mut renamed = 0;
        for column in self.columns.iter_mut() {
            if let Some(target) = mapping.get(column) {
                if target != column.as_str() {
                    *column = target.to_string();
                    renamed += 1;
                }
            }
        }
        renamed
    }
}
