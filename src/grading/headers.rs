// src/grading/headers.rs

use std::collections::HashMap;

use tracing::debug;

use super::GradeError;
use crate::sheets::TabularSource;

/// Cache of header label → column, resolved against a single header row.
///
/// A label binds only if it occurs exactly once in the header row. Bindings
/// live until [`HeaderBindings::invalidate`] is called.
#[derive(Debug, Clone)]
pub struct HeaderBindings {
    header_row: usize,
    resolved: HashMap<String, usize>,
}

impl HeaderBindings {
    pub fn new(header_row: usize) -> Self {
        Self {
            header_row,
            resolved: HashMap::new(),
        }
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Column of `label`, resolving it on first use.
    pub async fn column<S: TabularSource>(
        &mut self,
        source: &S,
        label: &str,
    ) -> Result<usize, GradeError> {
        if let Some(&col) = self.resolved.get(label) {
            return Ok(col);
        }

        let columns: Vec<usize> = source
            .find_cells_in_row(self.header_row, label)
            .await?
            .into_iter()
            .map(|c| c.col)
            .collect();

        match columns.as_slice() {
            [] => Err(GradeError::HeaderNotFound {
                label: label.to_string(),
                header_row: self.header_row,
            }),
            [col] => {
                debug!(label, col, "bound header");
                self.resolved.insert(label.to_string(), *col);
                Ok(*col)
            }
            _ => Err(GradeError::HeaderAmbiguous {
                label: label.to_string(),
                header_row: self.header_row,
                columns: columns.clone(),
            }),
        }
    }

    pub fn invalidate(&mut self) {
        self.resolved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::memory::MemorySheet;

    #[tokio::test]
    async fn test_binds_unique_label() {
        let sheet = MemorySheet::from_rows(&[&["", "First Name", "Last Name", "", "HW1"]]);
        let mut headers = HeaderBindings::new(1);
        assert_eq!(headers.column(&sheet, "HW1").await.unwrap(), 5);
        assert_eq!(headers.column(&sheet, "First Name").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_label() {
        let sheet = MemorySheet::from_rows(&[&["First Name", "Last Name"]]);
        let mut headers = HeaderBindings::new(1);
        let err = headers.column(&sheet, "HW1").await.unwrap_err();
        assert!(matches!(err, GradeError::HeaderNotFound { ref label, .. } if label == "HW1"));
    }

    #[tokio::test]
    async fn test_duplicate_label() {
        let sheet = MemorySheet::from_rows(&[&["HW1", "First Name", "HW1"]]);
        let mut headers = HeaderBindings::new(1);
        match headers.column(&sheet, "HW1").await {
            Err(GradeError::HeaderAmbiguous { columns, .. }) => assert_eq!(columns, vec![1, 3]),
            other => panic!("expected ambiguous header, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_matches_outside_header_row_are_ignored() {
        let sheet = MemorySheet::from_rows(&[
            &["Roster"],
            &["First Name", "Last Name", "Notes"],
            &["Ann", "Lee", "Notes"],
        ]);
        let mut headers = HeaderBindings::new(2);
        assert_eq!(headers.column(&sheet, "Notes").await.unwrap(), 3);

        let mut wrong_row = HeaderBindings::new(1);
        assert!(wrong_row.column(&sheet, "Notes").await.is_err());
    }

    #[tokio::test]
    async fn test_invalidate_forgets_bindings() {
        let sheet = MemorySheet::from_rows(&[&["HW1"]]);
        let mut headers = HeaderBindings::new(1);
        headers.column(&sheet, "HW1").await.unwrap();
        assert_eq!(headers.resolved.len(), 1);
        headers.invalidate();
        assert!(headers.resolved.is_empty());
    }
}
