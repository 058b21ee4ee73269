// src/report.rs

use std::fmt::Write;

use crate::grading::GradeRecord;

pub const MISSING_HEADER: &str = "# Missing students";
pub const AMBIGUOUS_HEADER: &str = "# Ambiguous students";

/// Render the unresolved records. Each section appears only when it has
/// entries; headers are `#` comments so the output parses as grade lines.
pub fn render(missing: &[GradeRecord], ambiguous: &[GradeRecord]) -> String {
    let mut out = String::new();
    for (header, records) in [(MISSING_HEADER, missing), (AMBIGUOUS_HEADER, ambiguous)] {
        if records.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(header);
        out.push('\n');
        for r in records {
            let _ = writeln!(out, "{r}");
        }
    }
    out
}
