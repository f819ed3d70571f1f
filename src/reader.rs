//! Quote-aware scanner turning delimited text into raw rows.
//!
//! The scanner is deliberately permissive: unbalanced quotes are not rejected,
//! the rest of the input simply lands in the open cell. A row made of a single
//! empty cell is never emitted, which keeps trailing newlines from producing
//! phantom rows (and also drops a blank record of a single-column table).

use crate::{CatalogError, CatalogResult};
use tracing::{debug, warn};

/// One physical record: cells in column order, untyped.
pub type RawRow = Vec<String>;

const DELIMITER: char = ',';
const QUOTE: char = '"';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unquoted,
    Quoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Append(char),
    /// `""` inside quotes: one literal quote, lookahead consumed.
    EscapedQuote,
    Toggle,
    EndCell,
    /// `skip_next` is set for `\r\n`.
    EndRow { skip_next: bool },
}

fn transition(state: ScanState, ch: char, next: Option<char>) -> (ScanState, Action) {
    use ScanState::*;

    match (state, ch) {
        (Quoted, QUOTE) if next == Some(QUOTE) => (Quoted, Action::EscapedQuote),
        (Quoted, QUOTE) => (Unquoted, Action::Toggle),
        (Unquoted, QUOTE) => (Quoted, Action::Toggle),
        (Unquoted, DELIMITER) => (Unquoted, Action::EndCell),
        (Unquoted, '\r') => (
            Unquoted,
            Action::EndRow {
                skip_next: next == Some('\n'),
            },
        ),
        (Unquoted, '\n') => (Unquoted, Action::EndRow { skip_next: false }),
        (state, ch) => (state, Action::Append(ch)),
    }
}

#[derive(Debug, Default)]
struct RowBuilder {
    rows: Vec<RawRow>,
    row: RawRow,
    cell: String,
}

impl RowBuilder {
    fn end_cell(&mut self) {
        self.row.push(std::mem::take(&mut self.cell));
    }

    fn end_row(&mut self) {
        self.end_cell();
        let row = std::mem::take(&mut self.row);
        if !is_blank_row(&row) {
            self.rows.push(row);
        }
    }

    fn finish(mut self) -> Vec<RawRow> {
        if !self.cell.is_empty() || !self.row.is_empty() {
            self.end_row();
        }
        self.rows
    }
}

fn is_blank_row(row: &[String]) -> bool {
    matches!(row, [only] if only.is_empty())
}

/// Scans `text` left to right into rows of raw cells.
pub fn parse_table(text: &str) -> Vec<RawRow> {
    let mut state = ScanState::Unquoted;
    let mut builder = RowBuilder::default();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let (next_state, action) = transition(state, ch, chars.peek().copied());
        state = next_state;

        match action {
            Action::Append(c) => builder.cell.push(c),
            Action::EscapedQuote => {
                builder.cell.push(QUOTE);
                chars.next();
            }
            Action::Toggle => {}
            Action::EndCell => builder.end_cell(),
            Action::EndRow { skip_next } => {
                if skip_next {
                    chars.next();
                }
                builder.end_row();
            }
        }
    }

    if state == ScanState::Quoted {
        warn!("input ended inside a quoted field; trailing text kept in the last cell");
    }

    let rows = builder.finish();
    debug!(rows = rows.len(), "table scanned");
    rows
}

/// Separates the header row from the data rows.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedInput`] when there is no header or no data row.
pub fn split_header(mut rows: Vec<RawRow>) -> CatalogResult<(RawRow, Vec<RawRow>)> {
    if rows.len() < 2 {
        return Err(CatalogError::MalformedInput(format!(
            "expected a header and at least one data row, found {} row(s)",
            rows.len()
        )));
    }

    let data = rows.split_off(1);
    let header = rows.into_iter().next().unwrap_or_default();
    Ok((header, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn quoted_cell_keeps_comma_newline_and_escaped_quote() {
        let text = "a,\"He said \"\"hi\"\", here: a,b\nsecond line\",z\n";
        let rows = parse_table(text);

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            row(&["a", "He said \"hi\", here: a,b\nsecond line", "z"])
        );
    }

    #[test]
    fn crlf_and_bare_cr_are_single_breaks() {
        let rows = parse_table("id,name\r\n1,a\r2,b\n");
        assert_eq!(rows, vec![row(&["id", "name"]), row(&["1", "a"]), row(&["2", "b"])]);
    }

    #[test]
    fn blank_lines_do_not_produce_rows() {
        let rows = parse_table("id,name\n\n1,a\n\n\n");
        assert_eq!(rows, vec![row(&["id", "name"]), row(&["1", "a"])]);
    }

    #[test]
    fn last_row_without_newline_is_flushed() {
        let rows = parse_table("id,name\n1,a");
        assert_eq!(rows, vec![row(&["id", "name"]), row(&["1", "a"])]);
    }

    #[test]
    fn row_of_empty_cells_is_kept() {
        let rows = parse_table("a,b\n,\n");
        assert_eq!(rows, vec![row(&["a", "b"]), row(&["", ""])]);
    }

    #[test]
    fn single_column_blank_record_is_dropped() {
        let rows = parse_table("name\n\"\"\nlock\n");
        assert_eq!(rows, vec![row(&["name"]), row(&["lock"])]);
    }

    #[test]
    fn quotes_toggle_mid_cell() {
        let rows = parse_table("ab\"c,d\"e\n");
        assert_eq!(rows, vec![row(&["abc,de"])]);
    }

    #[test]
    fn unbalanced_quote_swallows_the_rest() {
        let rows = parse_table("id,name\n1,\"open\n2,b\n");
        assert_eq!(rows, vec![row(&["id", "name"]), row(&["1", "open\n2,b\n"])]);
    }

    #[test]
    fn escaped_quote_only_applies_inside_quotes() {
        assert_eq!(
            transition(ScanState::Quoted, '"', Some('"')),
            (ScanState::Quoted, Action::EscapedQuote)
        );
        // Outside quotes `""` is an empty quoted section.
        assert_eq!(
            transition(ScanState::Unquoted, '"', Some('"')),
            (ScanState::Quoted, Action::Toggle)
        );
        assert_eq!(parse_table("a\"\"b\n"), vec![row(&["ab"])]);
    }

    #[test]
    fn breaks_and_delimiters_are_literal_inside_quotes() {
        for ch in [',', '\n', '\r'] {
            assert_eq!(
                transition(ScanState::Quoted, ch, None),
                (ScanState::Quoted, Action::Append(ch))
            );
        }
        assert_eq!(
            transition(ScanState::Unquoted, '\r', Some('\n')),
            (ScanState::Unquoted, Action::EndRow { skip_next: true })
        );
    }

    #[test]
    fn header_only_is_malformed() {
        let err = split_header(parse_table("id,slug,name\n")).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedInput(_)));

        let err = split_header(parse_table("")).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedInput(_)));
    }

    #[test]
    fn split_header_keeps_data_order() {
        let (header, data) = split_header(parse_table("id\n3\n1\n")).unwrap();
        assert_eq!(header, row(&["id"]));
        assert_eq!(data, vec![row(&["3"]), row(&["1"])]);
    }
}
