//! Comma-separated tables: the pop sink, the directory aggregator and the
//! row sampler all share the reader and writer below.
//!
//! Quoting follows the usual CSV conventions: a cell containing a comma,
//! a double quote or a line break is wrapped in quotes and inner quotes are
//! doubled. Records never span lines in these tables, so the reader works
//! line by line.

pub mod aggregate;
pub mod sample;
pub mod sink;

use std::io::{BufRead, Write};

use crate::error::{TableError, TableResult};

pub const CSV_EXTENSION: &str = "csv";

/// A table held in memory: the header row plus every data row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a whole table. `label` names the source in errors.
    /// Blank lines are skipped.
    pub fn read<R: BufRead>(reader: R, label: &str) -> TableResult<Self> {
        let mut lines = reader.lines();
        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break parse_row(&line);
                    }
                }
                None => {
                    return Err(TableError::EmptyTable {
                        path: label.to_string(),
                    })
                }
            }
        };

        let mut rows = Vec::new();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(parse_row(&line));
        }
        Ok(Self { header, rows })
    }

    pub fn write<W: Write>(&self, out: &mut W) -> TableResult<()> {
        write_row(out, &self.header)?;
        for row in &self.rows {
            write_row(out, row)?;
        }
        Ok(())
    }
}

pub fn write_row<W: Write, S: AsRef<str>>(out: &mut W, cells: &[S]) -> TableResult<()> {
    let line = cells
        .iter()
        .map(|c| escape_cell(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{}", line).map_err(TableError::from)
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Split one CSV line into cells, undoing the quoting from `write_row`.
pub fn parse_row(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if cell.is_empty() => in_quotes = true,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);
    cells
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_row() {
        assert_eq!(parse_row("a,b,,c"), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn quoted_cells() {
        let mut out = Vec::new();
        write_row(&mut out, &["x,y", "say \"hi\"", "z"]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\"x,y\",\"say \"\"hi\"\"\",z\n");
        assert_eq!(parse_row(text.trim_end()), vec!["x,y", "say \"hi\"", "z"]);
    }

    #[test]
    fn crlf_line() {
        assert_eq!(parse_row("1,2\r"), vec!["1", "2"]);
    }

    #[test]
    fn read_skips_blank_lines() {
        let t = Table::read("h1,h2\n\n1,2\n\n3,4\n".as_bytes(), "mem").unwrap();
        assert_eq!(t.header, vec!["h1", "h2"]);
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = Table::read("".as_bytes(), "empty.csv").unwrap_err();
        assert!(matches!(err, TableError::EmptyTable { ref path } if path == "empty.csv"));
    }

    #[test]
    fn write_then_read() {
        let t = Table {
            header: vec!["a".into(), "b".into()],
            rows: vec![vec!["1".into(), "x, y".into()]],
        };
        let mut out = Vec::new();
        t.write(&mut out).unwrap();
        assert_eq!(Table::read(out.as_slice(), "mem").unwrap(), t);
    }
}
