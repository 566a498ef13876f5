//! BibTeX parser built on the `biblatex` crate.
//!
//! Whole-file parsing is tried first. Exported profiles often carry small
//! syntax errors, so if the file as a whole is rejected each `@entry` is
//! parsed on its own and whatever parses is kept.
//!
//! # Example
//!
//! ```
//! use venuerank::{BibtexParser, CitationParser, EntryKind};
//!
//! let input = r#"@inproceedings{DBLP:conf/icse/DoeS22,
//!   author    = {Jane Doe and John Smith},
//!   title     = {Fast {API} Migration},
//!   booktitle = {44th {IEEE/ACM} International Conference on Software Engineering},
//!   year      = {2022}
//! }"#;
//!
//! let citations = BibtexParser::new().parse(input).unwrap();
//! assert_eq!(citations[0].entry_kind, EntryKind::InProceedings);
//! assert_eq!(citations[0].title, "Fast API Migration");
//! assert_eq!(citations[0].authors, vec!["Jane Doe", "John Smith"]);
//! ```

use crate::regex::Regex;
use crate::utils::{clean_text, format_doi, non_empty, split_authors};
use crate::{Citation, CitationParser, EntryKind, RankError, Result};
use biblatex::{Bibliography, Chunk, Entry, Spanned};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

static ENTRY_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*@[a-zA-Z]").unwrap());

/// Parser for BibTeX bibliographies.
#[derive(Debug, Default, Clone)]
pub struct BibtexParser;

impl BibtexParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Splits `input` at each line-leading `@` and parses every piece alone.
    fn parse_individually(input: &str) -> Vec<Bibliography> {
        let starts: Vec<usize> = ENTRY_START_REGEX.find_iter(input).map(|m| m.start()).collect();
        let mut parsed = Vec::new();
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(input.len());
            match Bibliography::parse(&input[start..end]) {
                Ok(bibliography) => parsed.push(bibliography),
                Err(e) => debug!(offset = start, error = %e, "skipping unparsable entry"),
            }
        }
        parsed
    }

    fn to_citation(entry: &Entry) -> Citation {
        let mut fields: HashMap<String, String> = entry
            .fields
            .iter()
            .map(|(name, chunks)| (name.to_ascii_lowercase(), chunks_to_string(chunks)))
            .collect();

        let mut take = |name: &str| fields.remove(name).map(|v| clean_text(&v)).and_then(non_empty);

        let title = take("title").unwrap_or_default();
        let year = take("year");
        let journal = take("journal");
        let booktitle = take("booktitle");
        let volume = take("volume");
        let number = take("number");
        let pages = take("pages");
        let url = take("url");
        let publisher = take("publisher");
        let doi = take("doi").and_then(|d| format_doi(&d));
        let authors = fields
            .remove("author")
            .map(|raw| split_authors(&raw))
            .unwrap_or_default();

        Citation {
            id: entry.key.clone(),
            entry_kind: EntryKind::from_bibtex(&entry.entry_type.to_string()),
            title,
            authors,
            year,
            journal,
            booktitle,
            volume,
            number,
            pages,
            doi,
            url,
            publisher,
            extra_fields: fields
                .into_iter()
                .map(|(name, value)| (name, clean_text(&value)))
                .collect(),
        }
    }
}

/// Flattens field chunks into one string.
fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|chunk| match &chunk.v {
            Chunk::Normal(s) | Chunk::Verbatim(s) | Chunk::Math(s) => s.as_str(),
        })
        .collect()
}

impl CitationParser for BibtexParser {
    /// Parses BibTeX text into citations, in file order.
    ///
    /// # Errors
    ///
    /// Returns `RankError::InvalidFormat` if the input is blank or no entry
    /// can be parsed
    fn parse(&self, input: &str) -> Result<Vec<Citation>> {
        if input.trim().is_empty() {
            return Err(RankError::InvalidFormat("Empty BibTeX input".to_string()));
        }

        let bibliographies = match Bibliography::parse(input) {
            Ok(bibliography) => vec![bibliography],
            Err(e) => {
                warn!(error = %e, "BibTeX file rejected as a whole, parsing entries one by one");
                Self::parse_individually(input)
            }
        };

        let citations: Vec<Citation> = bibliographies
            .iter()
            .flat_map(|bibliography| bibliography.iter())
            .map(Self::to_citation)
            .collect();

        if citations.is_empty() {
            return Err(RankError::InvalidFormat("No BibTeX entries found".to_string()));
        }
        Ok(citations)
    }
}
