use crate::config::ParserConfig;
use crate::error::{ParseError, ParseResult};

/// The sections the extractor cares about. The save never names them; the
/// role is mapped onto a position by `ParserConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    Metadata,
    Pops,
}

impl SectionRole {
    pub fn name(self) -> &'static str {
        match self {
            SectionRole::Metadata => "metadata",
            SectionRole::Pops => "pops",
        }
    }

    fn index(self, config: &ParserConfig) -> usize {
        match self {
            SectionRole::Metadata => config.metadata_section,
            SectionRole::Pops => config.pops_section,
        }
    }
}

/// A save split on the section marker. Borrows the raw text; the marker
/// itself is dropped.
#[derive(Debug, Clone)]
pub struct SaveDocument<'a> {
    sections: Vec<&'a str>,
    metadata_index: usize,
    pops_index: usize,
}

impl<'a> SaveDocument<'a> {
    /// Tokenize `raw` and check that every role the config needs is present.
    pub fn split(raw: &'a str, config: &ParserConfig) -> ParseResult<Self> {
        let sections = split_sections(raw, &config.marker);
        for role in [SectionRole::Metadata, SectionRole::Pops] {
            let index = role.index(config);
            if index >= sections.len() {
                return Err(ParseError::MissingSection {
                    role: role.name(),
                    index,
                    found: sections.len(),
                });
            }
        }
        Ok(Self {
            sections,
            metadata_index: config.metadata_section,
            pops_index: config.pops_section,
        })
    }

    pub fn section(&self, role: SectionRole) -> &'a str {
        let index = match role {
            SectionRole::Metadata => self.metadata_index,
            SectionRole::Pops => self.pops_index,
        };
        // Bounds were checked in `split`.
        self.sections[index]
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

/// Literal substring split. No escaping, no nesting.
pub fn split_sections<'a>(raw: &'a str, marker: &str) -> Vec<&'a str> {
    raw.split(marker).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_marker() {
        let parts = split_sections("meta database pops database rest", "database");
        assert_eq!(parts, vec!["meta ", " pops ", " rest"]);
    }

    #[test]
    fn no_marker_is_one_section() {
        assert_eq!(split_sections("game_date=2200.1.1", "database").len(), 1);
    }

    #[test]
    fn roles_address_configured_positions() {
        let doc = SaveDocument::split("A database B database C", &ParserConfig::default()).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.section(SectionRole::Metadata), "A ");
        assert_eq!(doc.section(SectionRole::Pops), " B ");
    }

    #[test]
    fn custom_layout() {
        let config = ParserConfig {
            marker: "|".into(),
            metadata_section: 2,
            pops_section: 0,
            ..Default::default()
        };
        let doc = SaveDocument::split("pops|junk|meta", &config).unwrap();
        assert_eq!(doc.section(SectionRole::Metadata), "meta");
        assert_eq!(doc.section(SectionRole::Pops), "pops");
    }

    #[test]
    fn missing_pops_section_names_the_role() {
        let err = SaveDocument::split("game_date=2200.01.01", &ParserConfig::default()).unwrap_err();
        match err {
            ParseError::MissingSection { role, index, found } => {
                assert_eq!(role, "pops");
                assert_eq!(index, 1);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
