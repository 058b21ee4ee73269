// src/sheets/mod.rs

pub mod a1;
pub mod client;
#[cfg(test)]
pub mod memory;

pub use client::SheetsClient;

use thiserror::Error;

/// A 1-indexed cell coordinate, as the spreadsheet addresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// One staged cell write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("sheets API returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// The capabilities the grading logic needs from a worksheet.
///
/// Rows and columns are 1-indexed on this boundary.
#[allow(async_fn_in_trait)]
pub trait TabularSource {
    /// Every cell whose value equals `value` exactly.
    async fn find_cells(&self, value: &str) -> Result<Vec<CellRef>, SourceError>;

    /// Cells in `row` whose value equals `value` exactly.
    async fn find_cells_in_row(&self, row: usize, value: &str) -> Result<Vec<CellRef>, SourceError> {
        Ok(self
            .find_cells(value)
            .await?
            .into_iter()
            .filter(|c| c.row == row)
            .collect())
    }

    /// The full column `col`. Element `i` holds row `i + 1`; trailing empty
    /// cells may be omitted.
    async fn column_values(&self, col: usize) -> Result<Vec<String>, SourceError>;

    /// Write all `updates` in a single call.
    async fn write_cells(&self, updates: &[CellUpdate]) -> Result<(), SourceError>;
}
