// src/sheets/a1.rs
//
// A1 notation helpers for building Sheets API ranges.

/// Column letters for a 1-indexed column: 1 → "A", 27 → "AA".
pub fn column_letters(col: usize) -> String {
    debug_assert!(col > 0, "columns are 1-indexed");
    let mut n = col;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Quote a worksheet title for use as a range prefix.
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// `'Sheet'!E4`
pub fn cell(sheet: &str, row: usize, col: usize) -> String {
    format!("{}!{}{}", quote_sheet(sheet), column_letters(col), row)
}

/// `'Sheet'!3:3`
pub fn whole_row(sheet: &str, row: usize) -> String {
    format!("{}!{}:{}", quote_sheet(sheet), row, row)
}

/// `'Sheet'!E:E`
pub fn whole_column(sheet: &str, col: usize) -> String {
    let letters = column_letters(col);
    format!("{}!{}:{}", quote_sheet(sheet), letters, letters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(5), "E");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
        assert_eq!(column_letters(702), "ZZ");
        assert_eq!(column_letters(703), "AAA");
    }

    #[test]
    fn test_ranges_quote_sheet_title() {
        assert_eq!(cell("Sheet1", 4, 5), "'Sheet1'!E4");
        assert_eq!(whole_column("Period 3", 2), "'Period 3'!B:B");
        assert_eq!(whole_row("Period 3", 1), "'Period 3'!1:1");
        assert_eq!(cell("Bob's", 1, 1), "'Bob''s'!A1");
    }
}
