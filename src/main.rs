mod batch;
mod config;
mod error;
mod parser;
mod table;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use config::{BatchConfig, ErrorPolicy, ParserConfig};

const COMBINED_TABLE: &str = "combined.csv";

#[derive(Parser)]
#[command(name = "savepop", about = "Extract pop tables from plaintext Victoria 3 saves")]
struct Cli {
    /// JSON file overriding the section marker, layout and date key
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one save into a pop table
    Extract {
        save: PathBuf,
        /// Output table (default: <save stem>.csv next to the save)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert every save in a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// What to do when a save cannot be parsed
        #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
        on_error: ErrorPolicy,
        /// Write a JSON report of every document's outcome
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Merge every table in a directory, dropping pops with no workforce
    Aggregate {
        input_dir: PathBuf,
        output: PathBuf,
    },
    /// Draw a uniform random sample of rows from a table
    Sample {
        table: PathBuf,
        /// Number of rows to keep
        #[arg(short = 'n', long)]
        count: usize,
        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
        /// Where to write the sample (default: next to the table)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Batch + aggregate (+ sample) in one pipeline
    Run {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// Sample this many rows from the combined table
        #[arg(short = 'n', long)]
        count: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
        on_error: ErrorPolicy,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let parser_config = match &cli.config {
        Some(path) => ParserConfig::load(path)?,
        None => ParserConfig::default(),
    };

    let result = match cli.command {
        Commands::Extract { save, output } => {
            let output = output.unwrap_or_else(|| save.with_extension("csv"));
            let (year, records) = batch::process_file(&save, &output, &parser_config)?;
            println!(
                "Saved {} pops for year {:?} to {}",
                records,
                year,
                output.display()
            );
            Ok(())
        }
        Commands::Batch {
            input_dir,
            output_dir,
            on_error,
            report,
        } => {
            let config = BatchConfig {
                parser: parser_config,
                on_error,
            };
            let summary = batch::process_dir(&input_dir, &output_dir, &config)?;
            summary.print();
            if let Some(path) = report {
                summary
                    .write_json(&path)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
            }
            Ok(())
        }
        Commands::Aggregate { input_dir, output } => aggregate(&input_dir, &output),
        Commands::Sample {
            table,
            count,
            seed,
            out_dir,
        } => sample(&table, count, seed, out_dir.as_deref()),
        Commands::Run {
            input_dir,
            output_dir,
            count,
            seed,
            on_error,
        } => {
            let config = BatchConfig {
                parser: parser_config,
                on_error,
            };
            let tables_dir = output_dir.join("tables");
            let summary = batch::process_dir(&input_dir, &tables_dir, &config)?;
            summary.print();
            if summary.processed == 0 {
                println!("Nothing to aggregate.");
                return Ok(());
            }
            let combined = output_dir.join(COMBINED_TABLE);
            aggregate(&tables_dir, &combined)?;
            if let Some(n) = count {
                sample(&combined, n, seed, None)?;
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn aggregate(input_dir: &Path, output: &Path) -> anyhow::Result<()> {
    let stats = table::aggregate::aggregate_dir(input_dir, output)
        .with_context(|| format!("Failed to aggregate tables in {}", input_dir.display()))?;
    println!(
        "Combined {} tables into {}: {} rows kept, {} without workforce dropped.",
        stats.tables,
        output.display(),
        stats.kept,
        stats.dropped
    );
    Ok(())
}

fn sample(table: &Path, n: usize, seed: Option<u64>, out_dir: Option<&Path>) -> anyhow::Result<()> {
    let output = table::sample::sample_file(table, n, seed, out_dir)
        .with_context(|| format!("Failed to sample {}", table.display()))?;
    println!("Wrote {} sampled rows to {}", n, output.display());
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_batch() {
        let cli = Cli::try_parse_from(["savepop", "batch", "saves", "out", "--on-error", "skip"]).unwrap();
        match cli.command {
            Commands::Batch { on_error, report, .. } => {
                assert_eq!(on_error, ErrorPolicy::Skip);
                assert!(report.is_none());
            }
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn cli_parses_sample() {
        let cli = Cli::try_parse_from(["savepop", "sample", "combined.csv", "-n", "500", "--seed", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Sample { count: 500, seed: Some(3), .. }));
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }
}
