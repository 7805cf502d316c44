use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::{Table, CSV_EXTENSION};
use crate::error::{TableError, TableResult};

/// Pick `n` distinct data rows uniformly at random. Picked rows keep their
/// relative order from the input.
pub fn sample_rows<R: Rng + ?Sized>(table: &Table, n: usize, rng: &mut R) -> TableResult<Table> {
    let available = table.rows.len();
    if n > available {
        return Err(TableError::SampleTooLarge {
            requested: n,
            available,
        });
    }
    let mut picked = rand::seq::index::sample(rng, available, n).into_vec();
    picked.sort_unstable();
    Ok(Table {
        header: table.header.clone(),
        rows: picked.into_iter().map(|i| table.rows[i].clone()).collect(),
    })
}

/// `cut_<stem>_<n>.csv`, beside the input unless `out_dir` is given.
pub fn sample_path(input: &Path, n: usize, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("cut_{}_{}.{}", stem, n, CSV_EXTENSION);
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Sample `n` rows of the table at `input` into a new file and return its
/// path. Nothing is written when the input is rejected.
pub fn sample_file(
    input: &Path,
    n: usize,
    seed: Option<u64>,
    out_dir: Option<&Path>,
) -> TableResult<PathBuf> {
    if !input.to_string_lossy().ends_with(".csv") {
        return Err(TableError::InvalidExtension {
            path: input.to_path_buf(),
        });
    }

    let label = input.display().to_string();
    let table = Table::read(BufReader::new(File::open(input)?), &label)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sampled = sample_rows(&table, n, &mut rng)?;

    let output = sample_path(input, n, out_dir);
    let mut out = BufWriter::new(File::create(&output)?);
    sampled.write(&mut out)?;
    out.flush()?;
    info!(
        "sampled {} of {} rows from {} into {}",
        n,
        table.rows.len(),
        input.display(),
        output.display()
    );
    Ok(output)
}
