//! Ranking catalogs and the layered venue matching strategy.
//!
//! Each catalog resolves a venue in up to three layers:
//!
//! 1. **Identifier**: a catalog-specific exact key (the DBLP URL for CCF, the
//!    ISSN for CAS).
//! 2. **Exact name**: equality of normalized names, first row wins.
//! 3. **Fuzzy name**: the best similarity ratio over all rows, accepted only
//!    when strictly above [`FUZZY_THRESHOLD`].
//!
//! A layer only runs when the previous one failed. Failures are values, never
//! errors: a [`MatchResult::NotMatched`] carries the [`NoMatchReason`].

use crate::normalize::{PrefixSet, normalize_name};
use crate::similarity;
use crate::{VenueKey, VenueKind};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod cas;
pub mod ccf;
pub mod csv;

/// Fuzzy matches must score strictly above this ratio.
pub const FUZZY_THRESHOLD: f64 = 0.8;

/// Which layer produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Identifier,
    NameExact,
    NameFuzzy,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Identifier => f.write_str("identifier"),
            MatchType::NameExact => f.write_str("name (exact)"),
            MatchType::NameFuzzy => f.write_str("name (fuzzy)"),
        }
    }
}

/// Why a venue did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    CatalogUnavailable,
    EmptyCatalog,
    NoName,
    NoIssn,
    NoIdentifierMatch,
    NoNameMatch,
    ConferencesUnsupported,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoMatchReason::CatalogUnavailable => "catalog unavailable",
            NoMatchReason::EmptyCatalog => "empty catalog",
            NoMatchReason::NoName => "no name",
            NoMatchReason::NoIssn => "no ISSN",
            NoMatchReason::NoIdentifierMatch => "no identifier match",
            NoMatchReason::NoNameMatch => "no name match",
            NoMatchReason::ConferencesUnsupported => "conferences unsupported",
        };
        f.write_str(text)
    }
}

/// Outcome of matching one venue against one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult<E> {
    Matched {
        entry: E,
        match_type: MatchType,
        /// Only set for [`MatchType::NameFuzzy`]
        similarity: Option<f64>,
    },
    NotMatched(NoMatchReason),
}

impl<E> MatchResult<E> {
    pub(crate) fn identifier(entry: E) -> Self {
        MatchResult::Matched {
            entry,
            match_type: MatchType::Identifier,
            similarity: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    pub fn entry(&self) -> Option<&E> {
        match self {
            MatchResult::Matched { entry, .. } => Some(entry),
            MatchResult::NotMatched(_) => None,
        }
    }

    pub fn match_type(&self) -> Option<MatchType> {
        match self {
            MatchResult::Matched { match_type, .. } => Some(*match_type),
            MatchResult::NotMatched(_) => None,
        }
    }

    pub fn similarity(&self) -> Option<f64> {
        match self {
            MatchResult::Matched { similarity, .. } => *similarity,
            MatchResult::NotMatched(_) => None,
        }
    }

    pub fn reason(&self) -> Option<NoMatchReason> {
        match self {
            MatchResult::Matched { .. } => None,
            MatchResult::NotMatched(reason) => Some(*reason),
        }
    }
}

/// What is known about a venue when it is looked up.
#[derive(Debug, Clone, Copy)]
pub struct VenueLookup<'a> {
    pub key: &'a VenueKey,
    /// Venue title, used for name fallback
    pub name: Option<&'a str>,
    /// Normalized ISSNs, used by ISSN-keyed catalogs
    pub issns: &'a [String],
}

impl<'a> VenueLookup<'a> {
    pub fn new(key: &'a VenueKey) -> Self {
        Self {
            key,
            name: None,
            issns: &[],
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: Option<&'a str>) -> Self {
        self.name = name.filter(|n| !n.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_issns(mut self, issns: &'a [String]) -> Self {
        self.issns = issns;
        self
    }
}

/// A ranking catalog with layered matching.
pub trait RankingCatalog {
    type Entry: Clone;

    /// Exact match on the catalog's identifier.
    fn match_by_identifier(&self, lookup: &VenueLookup<'_>) -> MatchResult<Self::Entry>;

    /// Exact then fuzzy match on the normalized venue name.
    fn match_by_name(&self, name: &str, kind: VenueKind) -> MatchResult<Self::Entry>;

    /// Identifier match, falling back to the name when the identifier fails
    /// and a name is known.
    fn match_venue(&self, lookup: &VenueLookup<'_>) -> MatchResult<Self::Entry> {
        let by_identifier = self.match_by_identifier(lookup);
        if by_identifier.is_matched() {
            return by_identifier;
        }
        match lookup.name {
            Some(name) => self.match_by_name(name, lookup.key.kind()),
            None => by_identifier,
        }
    }
}

/// Exact-then-fuzzy name matching over `entries`.
///
/// Rows with an empty name are skipped. The fuzzy pass only runs when no row
/// matches exactly; ties keep the earliest row.
pub(crate) fn match_name<E, F>(entries: &[E], name_of: F, query: &str, prefixes: PrefixSet) -> MatchResult<E>
where
    E: Clone,
    F: Fn(&E) -> &str,
{
    if entries.is_empty() {
        return MatchResult::NotMatched(NoMatchReason::EmptyCatalog);
    }
    let query = normalize_name(query, prefixes);
    if query.is_empty() {
        return MatchResult::NotMatched(NoMatchReason::NoName);
    }

    let candidates: Vec<(&E, String)> = entries
        .iter()
        .filter_map(|entry| {
            let raw = name_of(entry);
            (!raw.trim().is_empty()).then(|| (entry, normalize_name(raw, prefixes)))
        })
        .collect();

    if let Some((entry, _)) = candidates.iter().find(|(_, name)| *name == query) {
        return MatchResult::Matched {
            entry: (*entry).clone(),
            match_type: MatchType::NameExact,
            similarity: None,
        };
    }

    let mut best: Option<(&E, f64)> = None;
    let mut best_score = FUZZY_THRESHOLD;
    for (entry, name) in &candidates {
        let score = similarity::ratio(&query, name);
        if score > best_score {
            best_score = score;
            best = Some((*entry, score));
        }
    }

    match best {
        Some((entry, score)) => MatchResult::Matched {
            entry: entry.clone(),
            match_type: MatchType::NameFuzzy,
            similarity: Some(score),
        },
        None => MatchResult::NotMatched(NoMatchReason::NoNameMatch),
    }
}
