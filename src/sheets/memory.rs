// src/sheets/memory.rs
//
// In-memory worksheet used by the grading tests.

use std::sync::Mutex;

use super::{CellRef, CellUpdate, SourceError, TabularSource};

#[derive(Default)]
pub struct MemorySheet {
    rows: Mutex<Vec<Vec<String>>>,
    batches: Mutex<Vec<Vec<CellUpdate>>>,
    column_reads: Mutex<usize>,
}

impl MemorySheet {
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Every `write_cells` call received, in order.
    pub fn batches(&self) -> Vec<Vec<CellUpdate>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn column_reads(&self) -> usize {
        *self.column_reads.lock().unwrap()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<String> {
        let rows = self.rows.lock().unwrap();
        rows.get(row - 1).and_then(|r| r.get(col - 1)).cloned()
    }
}

impl TabularSource for MemorySheet {
    async fn find_cells(&self, value: &str) -> Result<Vec<CellRef>, SourceError> {
        let rows = self.rows.lock().unwrap();
        let mut hits = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell == value {
                    hits.push(CellRef { row: r + 1, col: c + 1 });
                }
            }
        }
        Ok(hits)
    }

    async fn column_values(&self, col: usize) -> Result<Vec<String>, SourceError> {
        *self.column_reads.lock().unwrap() += 1;
        let rows = self.rows.lock().unwrap();
        let mut column: Vec<String> = rows
            .iter()
            .map(|r| r.get(col - 1).cloned().unwrap_or_default())
            .collect();
        // the API omits trailing empty cells
        while column.last().is_some_and(|c| c.is_empty()) {
            column.pop();
        }
        Ok(column)
    }

    async fn write_cells(&self, updates: &[CellUpdate]) -> Result<(), SourceError> {
        let mut rows = self.rows.lock().unwrap();
        for u in updates {
            if rows.len() < u.row {
                rows.resize(u.row, Vec::new());
            }
            let row = &mut rows[u.row - 1];
            if row.len() < u.col {
                row.resize(u.col, String::new());
            }
            row[u.col - 1] = u.value.clone();
        }
        self.batches.lock().unwrap().push(updates.to_vec());
        Ok(())
    }
}
