use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{write_row, Table, CSV_EXTENSION};
use crate::error::{TableError, TableResult};

/// Index of `workforce` in the pop table layout.
const WORKFORCE_COLUMN: usize = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub tables: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Concatenate tables under the first table's header, dropping rows whose
/// workforce cell is exactly `"0"`. Headers of later tables are not checked.
pub fn merge<W: Write>(sources: &[(String, Table)], out: &mut W) -> TableResult<AggregateStats> {
    let mut stats = AggregateStats::default();
    let Some((_, first)) = sources.first() else {
        return Ok(stats);
    };
    write_row(out, &first.header)?;

    for (label, table) in sources {
        stats.tables += 1;
        for (idx, row) in table.rows.iter().enumerate() {
            let workforce = row.get(WORKFORCE_COLUMN).ok_or_else(|| TableError::MalformedRow {
                path: label.clone(),
                row: idx + 1,
            })?;
            if workforce == "0" {
                stats.dropped += 1;
                continue;
            }
            write_row(out, row)?;
            stats.kept += 1;
        }
    }
    Ok(stats)
}

/// Every `*.csv` directly inside `dir`, sorted by file name.
pub fn list_tables(dir: &Path) -> TableResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == CSV_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Merge every table in `input_dir` into `output`. If `output` itself lives
/// in `input_dir` it is not read back in.
pub fn aggregate_dir(input_dir: &Path, output: &Path) -> TableResult<AggregateStats> {
    let skip = fs::canonicalize(output).ok();
    let mut sources = Vec::new();
    for path in list_tables(input_dir)? {
        if skip.is_some() && fs::canonicalize(&path).ok() == skip {
            continue;
        }
        info!("processing file {}", path.display());
        let label = path.display().to_string();
        let table = Table::read(BufReader::new(File::open(&path)?), &label)?;
        sources.push((label, table));
    }
    if sources.is_empty() {
        warn!("no tables found in {}", input_dir.display());
    }

    let mut out = BufWriter::new(File::create(output)?);
    let stats = merge(&sources, &mut out)?;
    out.flush()?;
    info!(
        "combined {} tables into {} ({} rows kept, {} dropped)",
        stats.tables,
        output.display(),
        stats.kept,
        stats.dropped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "year,workforce,dependents,wealth,loyalists_and_radicals,literacy,job_satisfaction,profession,is_discriminated";

    fn table(body: &str) -> Table {
        Table::read(format!("{HEADER}\n{body}").as_bytes(), "mem").unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("savepop-aggregate-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn one_header_and_no_empty_pops() {
        let a = table("2200.0,100,0,0.0,0.0,0.0,0.0,farmer,0\n2200.0,0,0,0.0,0.0,0.0,0.0,none,0\n");
        let b = table("2200.5,0,5,0.0,0.0,0.0,0.0,clerks,1\n2200.5,7,0,1.5,0.0,0.0,0.0,clerks,0\n");
        let mut out = Vec::new();
        let stats = merge(&[("a".into(), a), ("b".into(), b)], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.iter().filter(|l| **l == HEADER).count(), 1);
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            &lines[1..],
            &[
                "2200.0,100,0,0.0,0.0,0.0,0.0,farmer,0",
                "2200.5,7,0,1.5,0.0,0.0,0.0,clerks,0",
            ]
        );
        assert_eq!(stats, AggregateStats { tables: 2, kept: 2, dropped: 2 });
    }

    #[test]
    fn only_literal_zero_is_dropped() {
        let t = table("2200.0,00,0,0.0,0.0,0.0,0.0,a,0\n2200.0,0.0,0,0.0,0.0,0.0,0.0,b,0\n");
        let mut out = Vec::new();
        let stats = merge(&[("t".into(), t)], &mut out).unwrap();
        assert_eq!(stats.kept, 2);
    }

    #[test]
    fn short_row_is_an_error() {
        let t = table("2200.0\n");
        let err = merge(&[("bad.csv".into(), t)], &mut Vec::new()).unwrap_err();
        assert!(matches!(err, TableError::MalformedRow { ref path, row: 1 } if path == "bad.csv"));
    }

    #[test]
    fn nothing_to_merge() {
        let mut out = Vec::new();
        let stats = merge(&[], &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(stats.tables, 0);
    }

    #[test]
    fn directory_round() {
        let dir = scratch_dir("dir");
        fs::write(dir.join("b.csv"), format!("{HEADER}\n1837.5,0,1,0.0,0.0,0.0,0.0,none,0\n")).unwrap();
        fs::write(dir.join("a.csv"), format!("{HEADER}\n1837.0,5,1,0.0,0.0,0.0,0.0,miners,0\n")).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        let output = dir.join("combined.csv");
        fs::write(&output, "stale,data\n").unwrap();

        let stats = aggregate_dir(&dir, &output).unwrap();
        assert_eq!(stats, AggregateStats { tables: 2, kept: 1, dropped: 1 });

        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text, format!("{HEADER}\n1837.0,5,1,0.0,0.0,0.0,0.0,miners,0\n"));
        let _ = fs::remove_dir_all(&dir);
    }
}
