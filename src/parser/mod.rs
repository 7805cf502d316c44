pub mod blocks;
pub mod date;
pub mod record;
pub mod sections;

use tracing::debug;

use crate::config::ParserConfig;
use crate::error::ParseResult;
use date::GameYear;
use record::PopRecord;
use sections::{SaveDocument, SectionRole};

/// Everything extracted from one save, ready for the table sink.
#[derive(Debug, Clone)]
pub struct ParsedSave {
    pub year: GameYear,
    /// (block id, row) in the order the blocks appear in the save.
    pub pops: Vec<(u64, PopRecord)>,
}

/// Four-pass pipeline: raw text → sections → (game year, pop blocks) → normalized rows.
pub fn parse_save(raw: &str, config: &ParserConfig) -> ParseResult<ParsedSave> {
    let doc = SaveDocument::split(raw, config)?;
    let year = date::extract_game_year(doc.section(SectionRole::Metadata), &config.date_key)?;
    let blocks = blocks::parse_blocks(doc.section(SectionRole::Pops), year)?;
    debug!(
        "{} sections, year {}, {} pops from {} opened blocks (unterminated: {:?})",
        doc.len(),
        year,
        blocks.records.len(),
        blocks.opened,
        blocks.unterminated
    );

    let pops = blocks
        .records
        .into_iter()
        .map(|(id, raw)| (id, record::normalize(raw)))
        .collect();

    Ok(ParsedSave { year, pops })
}
