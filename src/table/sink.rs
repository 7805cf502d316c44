use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::write_row;
use crate::error::TableResult;
use crate::parser::record::{PopRecord, COLUMNS};

/// Header, then one row per pop in the order given.
pub fn write_pops<'a, W, I>(out: &mut W, pops: I) -> TableResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a PopRecord>,
{
    write_row(out, &COLUMNS)?;
    let mut written = 0;
    for pop in pops {
        write_row(out, &pop.to_row())?;
        written += 1;
    }
    Ok(written)
}

pub fn write_pops_file<'a, I>(path: &Path, pops: I) -> TableResult<usize>
where
    I: IntoIterator<Item = &'a PopRecord>,
{
    let mut out = BufWriter::new(File::create(path)?);
    let written = write_pops(&mut out, pops)?;
    out.flush()?;
    Ok(written)
}
