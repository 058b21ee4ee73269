// src/input.rs
//
// Grade file format:
//
//     # comments and blank lines are ignored
//     HW1
//     j Doe 95
//     a Lee 88

use thiserror::Error;
use tracing::warn;

use crate::grading::GradeRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("grade file has no grade column label")]
    MissingLabel,
}

/// A line that did not split into `initial last_name score`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    pub line_no: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeSheet {
    pub grade_label: String,
    pub records: Vec<GradeRecord>,
    pub malformed: Vec<MalformedLine>,
}

/// Parse a grade file. Malformed record lines are skipped and returned in
/// `malformed`; they never abort the parse.
pub fn parse_grade_sheet(text: &str) -> Result<GradeSheet, InputError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let grade_label = lines
        .next()
        .map(|(_, line)| line.to_string())
        .ok_or(InputError::MissingLabel)?;

    let mut records = Vec::new();
    let mut malformed = Vec::new();
    for (line_no, line) in lines {
        match parse_record(line) {
            Some(record) => records.push(record),
            None => {
                warn!(line_no, line, "skipping malformed grade line");
                malformed.push(MalformedLine {
                    line_no,
                    text: line.to_string(),
                });
            }
        }
    }

    Ok(GradeSheet {
        grade_label,
        records,
        malformed,
    })
}

fn parse_record(line: &str) -> Option<GradeRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [first, last, score] = fields.as_slice() else {
        return None;
    };
    let initial = first.chars().next()?;
    Some(GradeRecord::new(initial, *last, *score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_label_and_records() {
        let sheet = parse_grade_sheet("HW 3\nj Doe 95\na  Lee\t88\n").unwrap();
        assert_eq!(sheet.grade_label, "HW 3");
        assert_eq!(
            sheet.records,
            vec![
                GradeRecord::new('j', "Doe", "95"),
                GradeRecord::new('a', "Lee", "88"),
            ]
        );
        assert!(sheet.malformed.is_empty());
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let text = "\n# period 3\n\n  HW1  \n# late work\nj Doe 95\n\n";
        let sheet = parse_grade_sheet(text).unwrap();
        assert_eq!(sheet.grade_label, "HW1");
        assert_eq!(sheet.records, vec![GradeRecord::new('j', "Doe", "95")]);
    }

    #[test]
    fn test_full_first_name_uses_initial() {
        let sheet = parse_grade_sheet("HW1\nJane Doe 95\n").unwrap();
        assert_eq!(sheet.records, vec![GradeRecord::new('J', "Doe", "95")]);
    }

    #[test]
    fn test_malformed_lines_are_collected() {
        let sheet = parse_grade_sheet("HW1\nj Doe\nj Doe 95\nj van Doe 80\n").unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(
            sheet.malformed,
            vec![
                MalformedLine { line_no: 2, text: "j Doe".into() },
                MalformedLine { line_no: 4, text: "j van Doe 80".into() },
            ]
        );
    }

    #[test]
    fn test_missing_label() {
        assert_eq!(parse_grade_sheet(""), Err(InputError::MissingLabel));
        assert_eq!(parse_grade_sheet("# only\n\n"), Err(InputError::MissingLabel));
    }
}
