// src/grading/batcher.rs

use tracing::{debug, info, warn};

use super::{GradeError, GradeRecord, HeaderBindings, NameIndex};
use crate::sheets::{CellUpdate, TabularSource};

/// Lifecycle of one batch. There is no way back to `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Staged,
    Committed,
}

/// Collects scores for one grade column and commits them in a single write.
///
/// Records that resolve to exactly one row are staged; records with no
/// matching row go to `missing`, records with several go to `ambiguous`.
/// Nothing reaches the sheet until [`GradeBatcher::flush`].
pub struct GradeBatcher<S> {
    source: S,
    headers: HeaderBindings,
    index: NameIndex,
    grade_label: String,
    pending: Vec<CellUpdate>,
    missing: Vec<GradeRecord>,
    ambiguous: Vec<GradeRecord>,
    state: BatchState,
}

impl<S: TabularSource> GradeBatcher<S> {
    pub fn new(
        source: S,
        headers: HeaderBindings,
        index: NameIndex,
        grade_label: impl Into<String>,
    ) -> Self {
        Self {
            source,
            headers,
            index,
            grade_label: grade_label.into(),
            pending: Vec::new(),
            missing: Vec::new(),
            ambiguous: Vec::new(),
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn grade_label(&self) -> &str {
        &self.grade_label
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve the grade, first-name and last-name headers up front so a bad
    /// header fails before any record is looked at.
    pub async fn bind_headers(&mut self) -> Result<(), GradeError> {
        self.headers.column(&self.source, &self.grade_label).await?;
        self.headers
            .column(&self.source, self.index.first_label())
            .await?;
        self.headers
            .column(&self.source, self.index.last_label())
            .await?;
        Ok(())
    }

    /// Resolve `record` and stage its write if exactly one row matches.
    pub async fn add_grade(&mut self, record: GradeRecord) -> Result<(), GradeError> {
        if self.state == BatchState::Committed {
            return Err(GradeError::AlreadyCommitted);
        }

        let grade_col = self.headers.column(&self.source, &self.grade_label).await?;
        let rows = self
            .index
            .resolve_row(
                &self.source,
                &mut self.headers,
                record.initial,
                &record.last_name,
            )
            .await?;

        match rows.as_slice() {
            [] => {
                warn!(student = %record, "no matching row");
                self.missing.push(record);
            }
            [row] => {
                debug!(student = %record, row, col = grade_col, "staged");
                self.pending.push(CellUpdate {
                    row: *row,
                    col: grade_col,
                    value: record.score,
                });
                self.state = BatchState::Staged;
            }
            _ => {
                warn!(student = %record, rows = ?rows, "several matching rows");
                self.ambiguous.push(record);
            }
        }
        Ok(())
    }

    /// Writes staged so far, in the order they were added.
    pub fn staged(&self) -> &[CellUpdate] {
        &self.pending
    }

    /// `(missing, ambiguous)` records seen so far.
    pub fn unresolved(&self) -> (&[GradeRecord], &[GradeRecord]) {
        (&self.missing, &self.ambiguous)
    }

    /// Commit every staged write in one call. Returns the number of cells written.
    pub async fn flush(&mut self) -> Result<usize, GradeError> {
        match self.state {
            BatchState::Committed => return Err(GradeError::AlreadyCommitted),
            BatchState::Idle => {
                info!("nothing staged; skipping write");
                self.state = BatchState::Committed;
                return Ok(0);
            }
            BatchState::Staged => {}
        }

        self.source.write_cells(&self.pending).await?;
        let written = self.pending.len();
        self.pending.clear();
        self.state = BatchState::Committed;
        info!(cells = written, column = %self.grade_label, "committed grades");
        Ok(written)
    }
}
