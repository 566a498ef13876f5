//! Venue resolution and ranking for academic bibliographies.
//!
//! `venuerank` takes a scholar's bibliography, works out where each paper was
//! published, and looks that venue up in two ranking catalogs:
//!
//! - **CCF**: the China Computer Federation list, ranking journals and
//!   conferences into categories A/B/C.
//! - **CAS**: the Chinese Academy of Sciences journal partition, ranking
//!   journals into zones 1–4 with a "top" flag.
//!
//! # Key Features
//!
//! - **Venue identity resolution** from DBLP-style identifiers
//!   (`DBLP:journals/tse/...`, `DBLP:conf/icse/...`) into a namespaced
//!   [`VenueKey`], so a journal and a conference sharing an abbreviation never
//!   collide.
//! - **Layered catalog matching**: exact identifier, exact normalized name,
//!   then fuzzy name with a strict similarity threshold.
//! - **Positive-only metadata cache** for venue titles and ISSNs fetched from
//!   DBLP.
//! - **Two-stage deduplication** that prefers published versions over CoRR
//!   preprints.
//! - **Aggregation** at venue and paper level without double counting.
//!
//! # Basic Usage
//!
//! ```rust
//! use venuerank::{BibtexParser, CitationParser};
//! use venuerank::identifier::VenueIndex;
//!
//! let input = r#"@article{DBLP:journals/tse/SmithD23,
//!   author  = {John Smith and Jane Doe},
//!   title   = {Testing Things},
//!   journal = {{IEEE} Trans. Software Eng.},
//!   year    = {2023}
//! }"#;
//!
//! let citations = BibtexParser::new().parse(input).unwrap();
//! let index = VenueIndex::build(&citations);
//! assert_eq!(index.len(), 1);
//! ```
//!
//! # Ranking a Bibliography
//!
//! ```rust
//! use venuerank::cache::VenueCache;
//! use venuerank::catalog::{cas::CasCatalog, ccf::CcfCatalog};
//! use venuerank::fetch::FetchError;
//! use venuerank::pipeline::Pipeline;
//!
//! let ccf = CcfCatalog::from_csv_str(
//!     "刊物名称,CCF推荐类型,网址\nIEEE Transactions on Software Engineering,A类,http://dblp.uni-trier.de/db/journals/tse/",
//! ).unwrap();
//! let cas = CasCatalog::unavailable();
//! let mut cache = VenueCache::in_memory();
//! let fetcher = |_: &str| -> Result<String, FetchError> { Err(FetchError::Other("offline".into())) };
//!
//! let pipeline = Pipeline::new(&ccf, &cas);
//! let report = pipeline.run(Vec::new(), &mut cache, &fetcher);
//! assert_eq!(report.paper_stats.total_papers, 0);
//! ```
//!
//! # Error Handling
//!
//! Only conditions that make a whole run meaningless surface as
//! [`RankError`]. Everything else (an identifier that is not DBLP-shaped, a
//! failed fetch, a missing catalog) degrades into a structured "not matched"
//! result with a reason:
//!
//! ```rust
//! use venuerank::{BibtexParser, CitationParser, RankError};
//!
//! match BibtexParser::new().parse("") {
//!     Ok(citations) => println!("Parsed {} citations", citations.len()),
//!     Err(RankError::InvalidFormat(msg)) => eprintln!("Parse error: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```
//!
//! # Logging
//!
//! The crate logs through [`tracing`]. It never installs a subscriber; that is
//! left to the host application.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

extern crate csv as csv_crate;

pub mod bibtex;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dedupe;
pub mod fetch;
pub mod identifier;
pub mod issn;
pub mod normalize;
pub mod pipeline;
pub mod ranking;
mod regex;
pub mod similarity;
mod utils;

// Reexports
pub use bibtex::BibtexParser;
pub use dedupe::Deduplicator;
pub use ranking::RankingOrchestrator;

/// A specialized Result type for venue ranking operations.
pub type Result<T> = std::result::Result<T, RankError>;

/// Errors that abort an operation outright.
#[derive(Error, Debug)]
pub enum RankError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl From<csv_crate::Error> for RankError {
    fn from(err: csv_crate::Error) -> Self {
        RankError::InvalidFormat(err.to_string())
    }
}

impl From<serde_json::Error> for RankError {
    fn from(err: serde_json::Error) -> Self {
        RankError::Cache(err.to_string())
    }
}

impl From<toml::de::Error> for RankError {
    fn from(err: toml::de::Error) -> Self {
        RankError::Config(err.to_string())
    }
}

/// BibTeX entry type of a citation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Article,
    InProceedings,
    #[default]
    Other,
}

impl EntryKind {
    /// Maps a BibTeX entry type name (case-insensitive) to an [`EntryKind`].
    pub fn from_bibtex(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "article" => EntryKind::Article,
            "inproceedings" | "conference" => EntryKind::InProceedings,
            _ => EntryKind::Other,
        }
    }
}

/// Represents a single bibliography entry with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Citation key, e.g. `DBLP:journals/tse/SmithD23`
    pub id: String,
    /// BibTeX entry type
    pub entry_kind: EntryKind,
    /// Title of the work
    pub title: String,
    /// Author names in file order
    pub authors: Vec<String>,
    /// Publication year as written
    pub year: Option<String>,
    /// Journal name (`journal` field)
    pub journal: Option<String>,
    /// Proceedings title (`booktitle` field)
    pub booktitle: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    pub pages: Option<String>,
    /// Digital Object Identifier
    pub doi: Option<String>,
    pub url: Option<String>,
    pub publisher: Option<String>,
    /// Additional fields not covered by standard fields
    pub extra_fields: HashMap<String, String>,
}

impl Citation {
    /// The venue name written for a venue of `kind`: the journal name for
    /// journals, the booktitle for conferences. Blank names are `None`.
    pub fn venue_name(&self, kind: VenueKind) -> Option<&str> {
        let name = match kind {
            VenueKind::Journal => self.journal.as_deref(),
            VenueKind::Conference => self.booktitle.as_deref(),
        };
        name.filter(|n| !n.trim().is_empty())
    }
}

/// Kind of a publication venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Journal,
    Conference,
}

impl VenueKind {
    /// DBLP path segment for this kind (`journals` or `conf`).
    pub fn dblp_segment(self) -> &'static str {
        match self {
            VenueKind::Journal => "journals",
            VenueKind::Conference => "conf",
        }
    }
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenueKind::Journal => f.write_str("journal"),
            VenueKind::Conference => f.write_str("conference"),
        }
    }
}

/// Namespaced venue identity.
///
/// Raw DBLP abbreviations are not unique across kinds (`journals/www` and
/// `conf/www` are different venues), so every lookup and every count is keyed
/// by this type rather than by the abbreviation alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "abbr", rename_all = "lowercase")]
pub enum VenueKey {
    Journal(String),
    Conference(String),
}

impl VenueKey {
    pub fn new(kind: VenueKind, abbr: impl Into<String>) -> Self {
        match kind {
            VenueKind::Journal => VenueKey::Journal(abbr.into()),
            VenueKind::Conference => VenueKey::Conference(abbr.into()),
        }
    }

    pub fn kind(&self) -> VenueKind {
        match self {
            VenueKey::Journal(_) => VenueKind::Journal,
            VenueKey::Conference(_) => VenueKind::Conference,
        }
    }

    /// The raw DBLP abbreviation, without namespace.
    pub fn abbr(&self) -> &str {
        match self {
            VenueKey::Journal(abbr) | VenueKey::Conference(abbr) => abbr,
        }
    }
}

impl fmt::Display for VenueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind(), self.abbr())
    }
}

/// Represents a group of duplicate citations with one retained citation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The citation kept in the deduplicated set
    pub unique: Citation,
    /// The citations dropped in its favour
    pub duplicates: Vec<Citation>,
}

/// Trait for implementing bibliography parsers.
pub trait CitationParser {
    /// Parse a string containing one or more bibliography entries.
    ///
    /// # Errors
    ///
    /// Returns `RankError` if the input is malformed or holds no entries
    fn parse(&self, input: &str) -> Result<Vec<Citation>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rank_error_display() {
        let error = RankError::InvalidFormat("Invalid entry".to_string());
        assert_eq!(error.to_string(), "Parse error: Invalid entry");
    }

    #[test]
    fn test_venue_key_namespacing() {
        let journal = VenueKey::new(VenueKind::Journal, "www");
        let conference = VenueKey::new(VenueKind::Conference, "www");
        assert_ne!(journal, conference);
        assert_eq!(journal.abbr(), conference.abbr());
        assert_eq!(journal.to_string(), "journal_www");
        assert_eq!(conference.to_string(), "conference_www");
    }

    #[test]
    fn test_venue_key_with_underscore_does_not_collide() {
        // "journal_x" as a conference abbreviation must stay distinct from Journal("x")
        let tricky = VenueKey::Conference("journal_x".to_string());
        let plain = VenueKey::Journal("x".to_string());
        assert_ne!(tricky, plain);
    }

    #[test]
    fn test_venue_name_by_venue_kind() {
        let citation = Citation {
            entry_kind: EntryKind::Other,
            journal: Some("CoRR".to_string()),
            booktitle: Some("ICSE".to_string()),
            ..Default::default()
        };
        assert_eq!(citation.venue_name(VenueKind::Conference), Some("ICSE"));
        assert_eq!(citation.venue_name(VenueKind::Journal), Some("CoRR"));

        let article = Citation {
            entry_kind: EntryKind::Article,
            journal: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(article.venue_name(VenueKind::Journal), None);
        assert_eq!(article.venue_name(VenueKind::Conference), None);
    }

    #[test]
    fn test_entry_kind_from_bibtex() {
        assert_eq!(EntryKind::from_bibtex("Article"), EntryKind::Article);
        assert_eq!(EntryKind::from_bibtex("inproceedings"), EntryKind::InProceedings);
        assert_eq!(EntryKind::from_bibtex("proceedings"), EntryKind::Other);
    }
}
