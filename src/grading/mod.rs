// src/grading/mod.rs

pub mod batcher;
pub mod headers;
pub mod index;

pub use batcher::{BatchState, GradeBatcher};
pub use headers::HeaderBindings;
pub use index::{NameColumns, NameIndex};

use std::fmt;

use thiserror::Error;

use crate::sheets::SourceError;

/// One student's score for the assignment being entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRecord {
    pub initial: char,
    pub last_name: String,
    pub score: String,
}

impl GradeRecord {
    pub fn new(initial: char, last_name: impl Into<String>, score: impl Into<String>) -> Self {
        Self {
            initial,
            last_name: last_name.into(),
            score: score.into(),
        }
    }
}

impl fmt::Display for GradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.initial, self.last_name, self.score)
    }
}

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("header '{label}' not found in row {header_row}")]
    HeaderNotFound { label: String, header_row: usize },

    #[error("header '{label}' appears more than once in row {header_row} (columns {columns:?})")]
    HeaderAmbiguous {
        label: String,
        header_row: usize,
        columns: Vec<usize>,
    },

    #[error("batch already committed; start a new batch")]
    AlreadyCommitted,

    #[error(transparent)]
    Source(#[from] SourceError),
}
