use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{BatchConfig, ErrorPolicy, ParserConfig};
use crate::error::BatchError;
use crate::parser;
use crate::table::sink;

/// Outcome for one save in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub year: Option<f64>,
    pub records: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
    pub records: usize,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn print(&self) {
        println!(
            "Converted {} saves ({} records), {} failed.",
            self.processed, self.records, self.failed
        );
        for doc in self.documents.iter().filter(|d| d.error.is_some()) {
            println!(
                "  {}: {}",
                doc.input.display(),
                doc.error.as_deref().unwrap_or_default()
            );
        }
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Table path for a save: `<output_dir>/<stem>.csv`.
pub fn table_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}.csv", stem))
}

/// Read, parse and write one save. Returns the number of pop rows written.
pub fn process_file(
    input: &Path,
    output: &Path,
    config: &ParserConfig,
) -> Result<(f64, usize), BatchError> {
    let raw = fs::read_to_string(input).map_err(|source| BatchError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let save = parser::parse_save(&raw, config).map_err(|source| BatchError::Parse {
        path: input.to_path_buf(),
        source,
    })?;
    let written = sink::write_pops_file(output, save.pops.iter().map(|(_, pop)| pop)).map_err(
        |source| BatchError::Write {
            path: input.to_path_buf(),
            source,
        },
    )?;
    Ok((save.year.value(), written))
}

/// Every regular file directly inside `dir`, sorted by name.
fn list_saves(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut saves = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            saves.push(path);
        }
    }
    saves.sort();
    Ok(saves)
}

/// Convert every save in `input_dir` into a table in `output_dir`.
///
/// With `ErrorPolicy::Abort` the first failing save ends the batch with its
/// error. With `ErrorPolicy::Skip` it is logged, recorded in the report and
/// the rest of the directory is still converted.
pub fn process_dir(
    input_dir: &Path,
    output_dir: &Path,
    config: &BatchConfig,
) -> anyhow::Result<BatchReport> {
    fs::create_dir_all(output_dir)?;
    let saves = list_saves(input_dir)?;
    info!("converting {} saves from {}", saves.len(), input_dir.display());

    let pb = ProgressBar::new(saves.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut report = BatchReport::default();
    for input in saves {
        let output = table_path(&input, output_dir);
        match process_file(&input, &output, &config.parser) {
            Ok((year, records)) => {
                info!(
                    "File \"{}\" processed and saved as \"{}\"",
                    input.display(),
                    output.display()
                );
                report.processed += 1;
                report.records += records;
                report.documents.push(DocumentReport {
                    input,
                    output: Some(output),
                    year: Some(year),
                    records,
                    error: None,
                });
            }
            Err(e) => match config.on_error {
                ErrorPolicy::Abort => {
                    pb.abandon();
                    return Err(e.into());
                }
                ErrorPolicy::Skip => {
                    warn!("skipping: {}", e);
                    report.failed += 1;
                    report.documents.push(DocumentReport {
                        input,
                        output: None,
                        year: None,
                        records: 0,
                        error: Some(e.to_string()),
                    });
                }
            },
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "game_date=1840.3.1\ndatabase={\n1={\nworkforce=10\ntype=miners\n}\n}";
    const BAD: &str = "game_date=1840.3.1\nno marker here";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("savepop-batch-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("saves")).unwrap();
        dir
    }

    #[test]
    fn table_name_follows_save_stem() {
        assert_eq!(
            table_path(Path::new("saves/autosave_3.v3"), Path::new("out")),
            PathBuf::from("out/autosave_3.csv")
        );
    }

    #[test]
    fn single_file() {
        let dir = scratch_dir("single");
        let input = dir.join("saves/a.v3");
        fs::write(&input, GOOD).unwrap();
        let output = dir.join("a.csv");
        let (year, n) = process_file(&input, &output, &ParserConfig::default()).unwrap();
        assert_eq!(year, 1840.0);
        assert_eq!(n, 1);
        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().nth(1), Some("1840.0,10,0,0.0,0.0,0.0,0.0,miners,0"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn abort_policy_stops_on_bad_save() {
        let dir = scratch_dir("abort");
        fs::write(dir.join("saves/a.v3"), BAD).unwrap();
        fs::write(dir.join("saves/b.v3"), GOOD).unwrap();
        let err = process_dir(&dir.join("saves"), &dir.join("out"), &BatchConfig::default()).unwrap_err();
        assert!(err.to_string().contains("a.v3"));
        assert!(!dir.join("out/b.csv").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn skip_policy_records_and_continues() {
        let dir = scratch_dir("skip");
        fs::write(dir.join("saves/a.v3"), BAD).unwrap();
        fs::write(dir.join("saves/b.v3"), GOOD).unwrap();
        let config = BatchConfig {
            on_error: ErrorPolicy::Skip,
            ..Default::default()
        };
        let report = process_dir(&dir.join("saves"), &dir.join("out"), &config).unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.records, 1);
        assert!(report.documents[0].error.as_deref().unwrap().contains("pops"));
        assert!(dir.join("out/b.csv").exists());
        assert!(!dir.join("out/a.csv").exists());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failed"], 1);
        let _ = fs::remove_dir_all(&dir);
    }
}
