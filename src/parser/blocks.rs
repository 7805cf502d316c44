use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::warn;

use super::date::GameYear;
use super::record::RawPopRecord;
use crate::error::{ParseError, ParseResult};

static BLOCK_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)=\{").unwrap());

/// Pop records keyed by block id, in the order the blocks were first opened.
pub type PopTable = IndexMap<u64, RawPopRecord>;

#[derive(Debug, Clone, PartialEq)]
enum Line<'a> {
    Open(u64),
    Close,
    Other(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InsideBlock(u64),
}

type Setter = fn(&mut RawPopRecord, &str) -> Result<(), &'static str>;

struct FieldRule {
    prefix: &'static str,
    key: &'static str,
    set: Setter,
}

/// Recognized keys inside a pop block, tried in order. A prefix without a
/// trailing `=` also matches suffixed keys (`dependents_x=..`).
const FIELD_RULES: &[FieldRule] = &[
    FieldRule { prefix: "workforce=", key: "workforce", set: set_workforce },
    FieldRule { prefix: "dependents", key: "dependents", set: set_dependents },
    FieldRule { prefix: "wealth=", key: "wealth", set: set_wealth },
    FieldRule {
        prefix: "loyalists_and_radicals=",
        key: "loyalists_and_radicals",
        set: set_loyalists_and_radicals,
    },
    FieldRule { prefix: "num_literate", key: "num_literate", set: set_literacy },
    FieldRule { prefix: "job_satisfaction", key: "job_satisfaction", set: set_job_satisfaction },
    FieldRule { prefix: "type", key: "type", set: set_profession },
    FieldRule { prefix: "is_discriminated", key: "is_discriminated", set: set_is_discriminated },
];

/// Output of one pass over the pops section.
#[derive(Debug, Default)]
pub struct ParsedBlocks {
    pub records: PopTable,
    /// Block-open lines matched, duplicates included.
    pub opened: usize,
    /// Id of a block still open when the input ran out.
    pub unterminated: Option<u64>,
}

/// Walk the pops section and build one record per `<id>={` block.
pub fn parse_blocks(pops: &str, year: GameYear) -> ParseResult<ParsedBlocks> {
    let mut parsed = ParsedBlocks::default();
    let mut state = State::Outside;

    for (idx, raw_line) in pops.lines().enumerate() {
        let line_no = idx + 1;
        let line = classify_line(raw_line.trim(), line_no)?;

        state = match (state, line) {
            (State::Outside, Line::Open(id)) => {
                parsed.records.insert(id, RawPopRecord::starting_in(year));
                parsed.opened += 1;
                State::InsideBlock(id)
            }
            (State::InsideBlock(_), Line::Close) => State::Outside,
            (State::InsideBlock(id), Line::Other(text)) => {
                if let Some(record) = parsed.records.get_mut(&id) {
                    apply_field(record, text, line_no)?;
                }
                State::InsideBlock(id)
            }
            // Nested id blocks, stray braces and `n=none` references carry no pop data.
            (state, _) => state,
        };
    }

    if let State::InsideBlock(id) = state {
        warn!("pop block {} is not closed before end of input, keeping it as read", id);
        parsed.unterminated = Some(id);
    }

    Ok(parsed)
}

fn classify_line(line: &str, line_no: usize) -> ParseResult<Line<'_>> {
    if line == "}" {
        return Ok(Line::Close);
    }
    if let Some(caps) = BLOCK_OPEN_RE.captures(line) {
        let digits = &caps[1];
        let id = digits.parse::<u64>().map_err(|_| ParseError::InvalidValue {
            line: line_no,
            key: "block id",
            value: digits.to_string(),
            expected: "a 64-bit id",
        })?;
        return Ok(Line::Open(id));
    }
    Ok(Line::Other(line))
}

fn apply_field(record: &mut RawPopRecord, line: &str, line_no: usize) -> ParseResult<()> {
    let Some(rule) = FIELD_RULES.iter().find(|r| line.starts_with(r.prefix)) else {
        return Ok(());
    };
    let Some((_, value)) = line.split_once('=') else {
        return Ok(());
    };
    (rule.set)(record, value).map_err(|expected| ParseError::InvalidValue {
        line: line_no,
        key: rule.key,
        value: value.to_string(),
        expected,
    })
}

fn int(value: &str) -> Result<i64, &'static str> {
    value.trim().parse().map_err(|_| "an integer")
}

fn float(value: &str) -> Result<f64, &'static str> {
    value.trim().parse().map_err(|_| "a number")
}

fn set_workforce(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.workforce = Some(int(v)?);
    Ok(())
}

fn set_dependents(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.dependents = Some(int(v)?);
    Ok(())
}

fn set_wealth(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.wealth = Some(float(v)?);
    Ok(())
}

fn set_loyalists_and_radicals(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.loyalists_and_radicals = Some(float(v)?);
    Ok(())
}

fn set_literacy(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.literacy = Some(float(v)?);
    Ok(())
}

fn set_job_satisfaction(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.job_satisfaction = Some(float(v)?);
    Ok(())
}

fn set_profession(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.profession = Some(v.to_string());
    Ok(())
}

fn set_is_discriminated(r: &mut RawPopRecord, v: &str) -> Result<(), &'static str> {
    r.is_discriminated = Some(u8::from(v == "yes"));
    Ok(())
}
