//! CCF (China Computer Federation) recommended venue list.
//!
//! Rows carry a DBLP URL per venue, so identifier matching is a URL segment
//! test: `/journals/<abbr>/` for journals, `/conf/<abbr>/` for conferences.

use super::csv::{CsvConfig, read_rows};
use super::{MatchResult, NoMatchReason, RankingCatalog, VenueLookup, match_name};
use crate::normalize::PrefixSet;
use crate::{Result, VenueKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Default header aliases for CCF catalog files.
const DEFAULT_HEADERS: &[(&str, &[&str])] = &[
    ("name", &["刊物名称", "name", "full name", "venue"]),
    ("abbr", &["Journal", "abbr", "abbreviation"]),
    (
        "category",
        &["CCF推荐类别（国际学术刊物/会议）", "CCF推荐类别", "category", "type"],
    ),
    ("rank", &["CCF推荐类型", "rank", "ccf rank"]),
    ("url", &["网址", "url", "dblp url"]),
];

const RANK_MARKER: char = '类';

/// CCF category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CcfRank {
    A,
    B,
    C,
}

impl CcfRank {
    pub const ALL: [CcfRank; 3] = [CcfRank::A, CcfRank::B, CcfRank::C];

    /// Parses a raw rank such as `A类` or `B`.
    ///
    /// Exactly one trailing `类` is stripped; anything else is unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.strip_suffix(RANK_MARKER).unwrap_or(raw) {
            "A" => Some(CcfRank::A),
            "B" => Some(CcfRank::B),
            "C" => Some(CcfRank::C),
            _ => None,
        }
    }
}

impl fmt::Display for CcfRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            CcfRank::A => "A",
            CcfRank::B => "B",
            CcfRank::C => "C",
        };
        f.write_str(letter)
    }
}

/// One row of the CCF list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcfEntry {
    /// Canonical venue name
    pub name: String,
    pub abbr: String,
    /// Journal or conference label as written in the catalog
    pub category: String,
    /// Raw rank, e.g. `A类`
    pub rank: String,
    /// DBLP URL of the venue
    pub url: String,
}

impl CcfEntry {
    pub fn rank_class(&self) -> Option<CcfRank> {
        CcfRank::parse(&self.rank)
    }

    fn matches_dblp_path(&self, kind: VenueKind, abbr: &str) -> bool {
        if self.url.is_empty() || abbr.is_empty() {
            return false;
        }
        let segment = format!("/{}/{}", kind.dblp_segment(), abbr);
        self.url.contains(&format!("{segment}/")) || self.url.ends_with(&segment)
    }
}

/// The CCF catalog, or the knowledge that it could not be loaded.
#[derive(Debug, Clone, Default)]
pub struct CcfCatalog {
    entries: Option<Vec<CcfEntry>>,
}

impl CcfCatalog {
    pub fn from_entries(entries: Vec<CcfEntry>) -> Self {
        Self {
            entries: Some(entries),
        }
    }

    /// A catalog that failed to load; every match reports it.
    pub fn unavailable() -> Self {
        Self { entries: None }
    }

    /// The header aliases used by [`CcfCatalog::from_csv_str`].
    pub fn default_csv_config() -> CsvConfig {
        CsvConfig::with_headers(DEFAULT_HEADERS)
    }

    pub fn from_csv_str(input: &str) -> Result<Self> {
        Self::from_csv_str_with_config(input, &Self::default_csv_config())
    }

    /// Parses catalog rows. The `name` and `rank` columns are required.
    pub fn from_csv_str_with_config(input: &str, config: &CsvConfig) -> Result<Self> {
        let entries = read_rows(input, config, &["name", "rank"])?
            .into_iter()
            .map(|row| CcfEntry {
                name: row.get("name").to_string(),
                abbr: row.get("abbr").to_string(),
                category: row.get("category").to_string(),
                rank: row.get("rank").to_string(),
                url: row.get("url").to_string(),
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
                info!(path = %path.display(), rows = catalog.len(), "loaded CCF catalog");
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "CCF catalog unavailable");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.entries.is_some()
    }

    pub fn entries(&self) -> &[CcfEntry] {
        self.entries.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl RankingCatalog for CcfCatalog {
    type Entry = CcfEntry;

    fn match_by_identifier(&self, lookup: &VenueLookup<'_>) -> MatchResult<CcfEntry> {
        let Some(entries) = &self.entries else {
            return MatchResult::NotMatched(NoMatchReason::CatalogUnavailable);
        };
        if entries.is_empty() {
            return MatchResult::NotMatched(NoMatchReason::EmptyCatalog);
        }

        let (kind, abbr) = (lookup.key.kind(), lookup.key.abbr());
        entries
            .iter()
            .find(|entry| entry.matches_dblp_path(kind, abbr))
            .map_or(
                MatchResult::NotMatched(NoMatchReason::NoIdentifierMatch),
                |entry| MatchResult::identifier(entry.clone()),
            )
    }

    /// Name matching covers journals and conferences alike.
    fn match_by_name(&self, name: &str, _kind: VenueKind) -> MatchResult<CcfEntry> {
        match &self.entries {
            Some(entries) => match_name(entries, |entry| entry.name.as_str(), name, PrefixSet::Publication),
            None => MatchResult::NotMatched(NoMatchReason::CatalogUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VenueKey;
    use crate::catalog::MatchType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = "\
序号,刊物名称,Journal,CCF推荐类别（国际学术刊物/会议）,CCF推荐类型,网址
1,IEEE Transactions on Software Engineering,TSE,国际学术刊物,A类,http://dblp.uni-trier.de/db/journals/tse/
2,World Wide Web,WWWJ,国际学术刊物,C类,https://dblp.org/db/journals/www/
3,International World Wide Web Conferences,WWW,国际学术会议,A类,https://dblp.org/db/conf/www
4,International Conference on Software Engineering,ICSE,国际学术会议,A类,http://dblp.uni-trier.de/db/conf/icse/
5,Pattern Recognition,PR,国际学术刊物,B类,https://dblp.org/db/journals/pr/
";

    fn catalog() -> CcfCatalog {
        CcfCatalog::from_csv_str(CATALOG).unwrap()
    }

    fn identifier_match(key: VenueKey) -> MatchResult<CcfEntry> {
        catalog().match_by_identifier(&VenueLookup::new(&key))
    }

    #[test]
    fn test_load_from_chinese_headers() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.entries()[0],
            CcfEntry {
                name: "IEEE Transactions on Software Engineering".to_string(),
                abbr: "TSE".to_string(),
                category: "国际学术刊物".to_string(),
                rank: "A类".to_string(),
                url: "http://dblp.uni-trier.de/db/journals/tse/".to_string(),
            }
        );
    }

    #[test]
    fn test_identifier_match_respects_kind() {
        let journal = identifier_match(VenueKey::Journal("www".into()));
        assert_eq!(journal.entry().map(|e| e.abbr.as_str()), Some("WWWJ"));
        assert_eq!(journal.match_type(), Some(MatchType::Identifier));

        // URL without trailing slash
        let conference = identifier_match(VenueKey::Conference("www".into()));
        assert_eq!(conference.entry().map(|e| e.abbr.as_str()), Some("WWW"));
    }

    #[test]
    fn test_identifier_does_not_match_abbreviation_prefix() {
        let result = identifier_match(VenueKey::Journal("ts".into()));
        assert_eq!(result.reason(), Some(NoMatchReason::NoIdentifierMatch));
        let result = identifier_match(VenueKey::Conference("tse".into()));
        assert_eq!(result.reason(), Some(NoMatchReason::NoIdentifierMatch));
    }

    #[test]
    fn test_name_fallback_after_identifier_miss() {
        let key = VenueKey::Journal("tsex".into());
        let lookup = VenueLookup::new(&key).with_name(Some("IEEE Transactions on Software Engineering"));
        let result = catalog().match_venue(&lookup);
        assert_eq!(result.match_type(), Some(MatchType::NameExact));
        assert_eq!(result.entry().map(|e| e.abbr.as_str()), Some("TSE"));
    }

    #[rstest]
    #[case(VenueKey::Journal("tse".into()), "TSE")]
    #[case(VenueKey::Conference("icse".into()), "ICSE")]
    fn test_identifier_first_row_wins(#[case] key: VenueKey, #[case] expected: &str) {
        let catalog = CcfCatalog::from_csv_str(
            "刊物名称,Journal,CCF推荐类型,网址\n\
             Software Engineering A,TSE,A类,https://dblp.org/db/journals/tse/\n\
             Software Engineering B,TSE2,B类,http://dblp.uni-trier.de/db/journals/tse/\n\
             Conference A,ICSE,A类,https://dblp.org/db/conf/icse\n\
             Conference B,ICSE2,C类,https://dblp.org/db/conf/icse/\n",
        )
        .unwrap();
        let result = catalog.match_by_identifier(&VenueLookup::new(&key));
        assert_eq!(result.entry().map(|e| e.abbr.as_str()), Some(expected));
    }

    #[test]
    fn test_failed_name_fallback_reports_name_reason() {
        let key = VenueKey::Journal("nope".into());
        let lookup = VenueLookup::new(&key).with_name(Some("Journal of Underwater Basket Weaving"));
        assert_eq!(catalog().match_venue(&lookup).reason(), Some(NoMatchReason::NoNameMatch));

        let without_name = VenueLookup::new(&key);
        assert_eq!(
            catalog().match_venue(&without_name).reason(),
            Some(NoMatchReason::NoIdentifierMatch)
        );
    }

    #[rstest]
    #[case("A类", Some(CcfRank::A))]
    #[case("B", Some(CcfRank::B))]
    #[case(" C类 ", Some(CcfRank::C))]
    #[case("A类类", None)]
    #[case("D类", None)]
    #[case("", None)]
    fn test_rank_parse(#[case] raw: &str, #[case] expected: Option<CcfRank>) {
        assert_eq!(CcfRank::parse(raw), expected);
    }

    #[test]
    fn test_unavailable_and_empty_catalogs() {
        let key = VenueKey::Journal("tse".into());
        let lookup = VenueLookup::new(&key).with_name(Some("IEEE Transactions on Software Engineering"));

        let unavailable = CcfCatalog::unavailable();
        assert_eq!(unavailable.match_venue(&lookup).reason(), Some(NoMatchReason::CatalogUnavailable));

        let empty = CcfCatalog::from_entries(Vec::new());
        assert_eq!(empty.match_venue(&lookup).reason(), Some(NoMatchReason::EmptyCatalog));
    }

    #[test]
    fn test_open_degrades_on_bad_file() {
        assert!(!CcfCatalog::open("/nonexistent/ccf.csv").is_available());

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Title,Link\nx,y").unwrap();
        assert!(!CcfCatalog::open(file.path()).is_available());

        let mut good = NamedTempFile::new().unwrap();
        write!(good, "{CATALOG}").unwrap();
        assert_eq!(CcfCatalog::open(good.path()).len(), 5);
    }
}
