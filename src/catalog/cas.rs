//! CAS (Chinese Academy of Sciences) journal partition table.
//!
//! Journals only. Identifier matching is by ISSN: each candidate ISSN is
//! tested, in order, against the ISSN field of every row.

use super::csv::{CsvConfig, read_rows};
use super::{MatchResult, NoMatchReason, RankingCatalog, VenueLookup, match_name};
use crate::normalize::PrefixSet;
use crate::{Result, VenueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const DEFAULT_HEADERS: &[(&str, &[&str])] = &[
    ("name", &["Journal", "name", "journal name"]),
    ("issn", &["ISSN/EISSN", "issn", "issn/eissn"]),
    ("zone", &["大类分区", "zone", "partition"]),
    ("top", &["Top"]),
    ("category", &["大类", "category"]),
    ("small_category", &["小类1", "small category", "subcategory"]),
];

/// The only `Top` value that marks a top journal.
pub const TOP_MARKER: &str = "是";

const ZONE_SUFFIX: char = '区';

/// Parses the leading zone number of a composite such as `3 [224/758]`.
///
/// Returns `None` unless the zone is 1 to 4.
pub fn parse_zone(raw: &str) -> Option<u8> {
    let token = raw.split_whitespace().next()?;
    let token = token.strip_suffix(ZONE_SUFFIX).unwrap_or(token);
    token.parse::<u8>().ok().filter(|zone| (1..=4).contains(zone))
}

/// One row of the CAS table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasEntry {
    pub name: String,
    /// Primary ISSN, the part of the `ISSN/EISSN` column before the slash
    pub issn: String,
    /// Major-category zone
    pub zone: Option<u8>,
    /// Raw `Top` column value
    pub top: String,
    pub category: String,
    pub small_category: String,
}

impl CasEntry {
    pub fn is_top(&self) -> bool {
        self.top == TOP_MARKER
    }
}

/// The CAS catalog, or the knowledge that it could not be loaded.
#[derive(Debug, Clone, Default)]
pub struct CasCatalog {
    entries: Option<Vec<CasEntry>>,
}

impl CasCatalog {
    pub fn from_entries(entries: Vec<CasEntry>) -> Self {
        Self {
            entries: Some(entries),
        }
    }

    pub fn unavailable() -> Self {
        Self { entries: None }
    }

    pub fn default_csv_config() -> CsvConfig {
        CsvConfig::with_headers(DEFAULT_HEADERS)
    }

    pub fn from_csv_str(input: &str) -> Result<Self> {
        Self::from_csv_str_with_config(input, &Self::default_csv_config())
    }

    /// Parses catalog rows. The `name` and `zone` columns are required.
    pub fn from_csv_str_with_config(input: &str, config: &CsvConfig) -> Result<Self> {
        let rows = read_rows(input, config, &["name", "zone"])?;
        let entries = rows
            .into_iter()
            .map(|row| {
                let zone = parse_zone(row.get("zone"));
                if zone.is_none() {
                    warn!(line = row.line_number, zone = row.get("zone"), "unrecognized CAS zone");
                }
                let issn = row.get("issn");
                CasEntry {
                    name: row.get("name").to_string(),
                    issn: issn.split('/').next().unwrap_or(issn).trim().to_string(),
                    zone,
                    top: row.get("top").to_string(),
                    category: row.get("category").to_string(),
                    small_category: row.get("small_category").to_string(),
                }
            })
            .collect();
        Ok(Self::from_entries(entries))
    }

    /// Loads the catalog file at `path`, degrading to an unavailable catalog
    /// if it cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with_config(path, &Self::default_csv_config())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: &CsvConfig) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(Into::into)
            .and_then(|content| Self::from_csv_str_with_config(&content, config));
        match loaded {
            Ok(catalog) => {
                info!(path = %path.display(), rows = catalog.len(), "loaded CAS catalog");
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "CAS catalog unavailable");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.entries.is_some()
    }

    pub fn entries(&self) -> &[CasEntry] {
        self.entries.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl RankingCatalog for CasCatalog {
    type Entry = CasEntry;

    fn match_by_identifier(&self, lookup: &VenueLookup<'_>) -> MatchResult<CasEntry> {
        if lookup.key.kind() == VenueKind::Conference {
            return MatchResult::NotMatched(NoMatchReason::ConferencesUnsupported);
        }
        let Some(entries) = &self.entries else {
            return MatchResult::NotMatched(NoMatchReason::CatalogUnavailable);
        };
        if entries.is_empty() {
            return MatchResult::NotMatched(NoMatchReason::EmptyCatalog);
        }
        if lookup.issns.is_empty() {
            return MatchResult::NotMatched(NoMatchReason::NoIssn);
        }

        lookup
            .issns
            .iter()
            .filter(|issn| !issn.is_empty())
            .find_map(|issn| entries.iter().find(|entry| entry.issn.contains(issn.as_str())))
            .map_or(
                MatchResult::NotMatched(NoMatchReason::NoIdentifierMatch),
                |entry| MatchResult::identifier(entry.clone()),
            )
    }

    fn match_by_name(&self, name: &str, kind: VenueKind) -> MatchResult<CasEntry> {
        if kind == VenueKind::Conference {
            return MatchResult::NotMatched(NoMatchReason::ConferencesUnsupported);
        }
        let Some(entries) = &self.entries else {
            return MatchResult::NotMatched(NoMatchReason::CatalogUnavailable);
        };
        match_name(entries, |entry| entry.name.as_str(), name, PrefixSet::Journal)
    }
}
