use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, instrument};

use crate::error::{Result, ToolError};
use crate::model::{Cell, TAXON_COLUMN, Table};

/// Identifier headers that are renamed to [`TAXON_COLUMN`], by priority.
pub const IDENTIFIER_ALIASES: [&str; 2] = ["#OTU ID", "OTU ID"];

/// Reads a tab-delimited abundance table and indexes it by taxon.
///
/// Lines starting with `#` are comments unless their first field is
/// `#OTU ID`, in which case the line is the header. Blank lines are skipped
/// and short rows are padded with empty cells.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<Table> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|err| ToolError::Parse {
        path: path.to_path_buf(),
        line: 0,
        message: format!("not valid UTF-8: {err}"),
    })?;
    parse_table(path, &text)
}

/// Parses table text; `path` is only used for error reporting. A leading
/// byte-order mark is dropped.
pub fn parse_table(path: &Path, text: &str) -> Result<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (header_line, mut columns, body) =
        split_header(text).ok_or_else(|| ToolError::Parse {
            path: path.to_path_buf(),
            line: 0,
            message: "no header row".to_string(),
        })?;

    let index_pos = normalize_identifier(&mut columns).ok_or_else(|| ToolError::MissingColumn {
        path: path.to_path_buf(),
        found: columns.clone(),
    })?;
    let index_name = columns.remove(index_pos);
    let width = columns.len() + 1;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut table = Table {
        index_name,
        index: Vec::new(),
        columns,
        rows: Vec::new(),
    };

    let mut record = StringRecord::new();
    loop {
        let more = reader.read_record(&mut record).map_err(|err| {
            let line = err
                .position()
                .map(|pos| header_line + pos.line())
                .unwrap_or(header_line);
            ToolError::Parse {
                path: path.to_path_buf(),
                line,
                message: err.to_string(),
            }
        })?;
        if !more {
            break;
        }

        let line = record
            .position()
            .map(|pos| header_line + pos.line())
            .unwrap_or(header_line);
        if record.len() > width {
            return Err(ToolError::Parse {
                path: path.to_path_buf(),
                line,
                message: format!("expected {width} fields, found {}", record.len()),
            });
        }

        let mut label = String::new();
        let mut cells = Vec::with_capacity(width - 1);
        for (col_idx, field) in record.iter().enumerate() {
            if col_idx == index_pos {
                label = field.to_string();
            } else {
                cells.push(Cell::parse(field));
            }
        }
        cells.resize(width - 1, Cell::Empty);

        table.index.push(label);
        table.rows.push(cells);
    }

    debug!(
        taxa = table.index.len(),
        samples = table.columns.len(),
        "table parsed"
    );
    Ok(table)
}

/// Renames the identifier column to [`TAXON_COLUMN`] and returns its
/// position, or `None` when no accepted identifier column exists.
pub fn normalize_identifier(columns: &mut [String]) -> Option<usize> {
    for alias in IDENTIFIER_ALIASES {
        if let Some(pos) = columns.iter().position(|name| name == alias) {
            columns[pos] = TAXON_COLUMN.to_string();
            return Some(pos);
        }
    }
    columns.iter().position(|name| name == TAXON_COLUMN)
}

/// Locates the header line. Returns its 1-based line number, the column
/// names, and the remaining text.
fn split_header(text: &str) -> Option<(u64, Vec<String>, &str)> {
    let mut offset = 0;
    for (line_idx, raw_line) in text.split_inclusive('\n').enumerate() {
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        let first_field = line.split('\t').next().unwrap_or_default();
        if line.starts_with('#') && first_field != IDENTIFIER_ALIASES[0] {
            continue;
        }
        let columns = line.split('\t').map(str::to_string).collect();
        return Some((line_idx as u64 + 1, columns, &text[offset..]));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn identifier_aliases_are_renamed() {
        let mut hashed = columns(&["#OTU ID", "S1"]);
        assert_eq!(normalize_identifier(&mut hashed), Some(0));
        assert_eq!(hashed, columns(&["Taxon", "S1"]));

        let mut plain = columns(&["S1", "OTU ID"]);
        assert_eq!(normalize_identifier(&mut plain), Some(1));
        assert_eq!(plain, columns(&["S1", "Taxon"]));

        let mut taxon = columns(&["Taxon", "S1"]);
        assert_eq!(normalize_identifier(&mut taxon), Some(0));

        let mut none = columns(&["Feature", "S1"]);
        assert_eq!(normalize_identifier(&mut none), None);
    }

    #[test]
    fn header_skips_leading_comments() {
        let text = "# Constructed from biom file\n#OTU ID\tS1\nk__Bacteria\t4\n";
        let (line, header, body) = split_header(text).expect("header found");
        assert_eq!(line, 2);
        assert_eq!(header, columns(&["#OTU ID", "S1"]));
        assert_eq!(body, "k__Bacteria\t4\n");
    }

    #[test]
    fn header_missing_in_comment_only_text() {
        assert!(split_header("# only a comment\n\n").is_none());
    }

    #[test]
    fn crlf_rows_are_trimmed() {
        let table = parse_table(Path::new("t.tsv"), "OTU ID\tS1\r\nk__Archaea\t3\r\n")
            .expect("table parsed");
        assert_eq!(table.columns, columns(&["S1"]));
        assert_eq!(table.get("k__Archaea", "S1"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn leading_byte_order_mark_is_dropped() {
        let table = parse_table(Path::new("t.tsv"), "\u{feff}#OTU ID\tS1\nk__Archaea\t3\n")
            .expect("table parsed");
        assert_eq!(table.index_name, "Taxon");
        assert_eq!(table.index, columns(&["k__Archaea"]));

        let table = parse_table(
            Path::new("t.tsv"),
            "\u{feff}# Constructed from biom file\n#OTU ID\tS1\nk__Archaea\t3\n",
        )
        .expect("table parsed");
        assert_eq!(table.columns, columns(&["S1"]));
        assert_eq!(table.get("k__Archaea", "S1"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn short_rows_are_padded() {
        let table = parse_table(Path::new("t.tsv"), "Taxon\tS1\tS2\nk__Fungi\t1\n")
            .expect("table parsed");
        assert_eq!(table.rows, vec![vec![Cell::Number(1.0), Cell::Empty]]);
    }
}
