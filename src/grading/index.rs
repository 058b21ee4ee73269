// src/grading/index.rs

use std::collections::HashSet;

use tracing::info;

use super::{GradeError, HeaderBindings};
use crate::sheets::TabularSource;

/// Lowercased, trimmed snapshots of the first- and last-name columns.
///
/// Index `i` in either list is sheet row `i + 1`.
#[derive(Debug, Clone, Default)]
pub struct NameColumns {
    first: Vec<String>,
    last: Vec<String>,
}

impl NameColumns {
    pub fn new(first: Vec<String>, last: Vec<String>) -> Self {
        Self {
            first: first.iter().map(|s| normalize(s)).collect(),
            last: last.iter().map(|s| normalize(s)).collect(),
        }
    }

    /// Sheet rows below `header_row` whose first name starts with `initial`
    /// and whose last name equals `last_name`, ignoring case. Sorted ascending.
    pub fn matching_rows(&self, initial: char, last_name: &str, header_row: usize) -> Vec<usize> {
        let initial = initial.to_lowercase().next().unwrap_or(initial);
        let last_name = normalize(last_name);

        let by_initial: HashSet<usize> = self
            .first
            .iter()
            .enumerate()
            .filter(|(_, name)| name.chars().next() == Some(initial))
            .map(|(i, _)| i)
            .collect();
        let by_last: HashSet<usize> = self
            .last
            .iter()
            .enumerate()
            .filter(|(_, name)| **name == last_name)
            .map(|(i, _)| i)
            .collect();

        let mut rows: Vec<usize> = by_initial
            .intersection(&by_last)
            .map(|i| i + 1)
            .filter(|&row| row > header_row)
            .collect();
        rows.sort_unstable();
        rows
    }

    pub fn len(&self) -> usize {
        self.first.len().max(self.last.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Session cache of the name columns, loaded on the first lookup.
#[derive(Debug, Clone)]
pub struct NameIndex {
    first_label: String,
    last_label: String,
    columns: Option<NameColumns>,
}

impl NameIndex {
    pub fn new(first_label: impl Into<String>, last_label: impl Into<String>) -> Self {
        Self {
            first_label: first_label.into(),
            last_label: last_label.into(),
            columns: None,
        }
    }

    pub fn first_label(&self) -> &str {
        &self.first_label
    }

    pub fn last_label(&self) -> &str {
        &self.last_label
    }

    /// Rows matching `initial` + `last_name`; empty, one, or several.
    pub async fn resolve_row<S: TabularSource>(
        &mut self,
        source: &S,
        headers: &mut HeaderBindings,
        initial: char,
        last_name: &str,
    ) -> Result<Vec<usize>, GradeError> {
        let header_row = headers.header_row();
        let columns = self.load(source, headers).await?;
        Ok(columns.matching_rows(initial, last_name, header_row))
    }

    async fn load<S: TabularSource>(
        &mut self,
        source: &S,
        headers: &mut HeaderBindings,
    ) -> Result<&NameColumns, GradeError> {
        let columns = match self.columns.take() {
            Some(cached) => cached,
            None => {
                let first_col = headers.column(source, &self.first_label).await?;
                let last_col = headers.column(source, &self.last_label).await?;
                let first = source.column_values(first_col).await?;
                let last = source.column_values(last_col).await?;
                let columns = NameColumns::new(first, last);
                info!(rows = columns.len(), first_col, last_col, "loaded name columns");
                columns
            }
        };
        Ok(self.columns.insert(columns))
    }

    pub fn invalidate(&mut self) {
        self.columns = None;
    }
}
