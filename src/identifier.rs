//! DBLP-style identifier resolution and the venue index.
//!
//! Citation keys exported by DBLP embed the venue path, e.g.
//! `DBLP:journals/tse/SmithD23` or `DBLP:conf/icse/LiuW22`. The journal form is
//! tried first, then the conference form.

use crate::regex::Regex;
use crate::{Citation, VenueKey, VenueKind};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static JOURNAL_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bjournals/([^/\s]+)/").unwrap());

static CONFERENCE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bconf/([^/\s]+)/").unwrap());

/// Resolves an identifier to its namespaced venue key.
///
/// Returns `None` when the identifier carries neither a `journals/<abbr>/` nor
/// a `conf/<abbr>/` segment.
///
/// ```
/// use venuerank::identifier::resolve;
/// use venuerank::VenueKey;
///
/// assert_eq!(resolve("DBLP:journals/tse/SmithD23"), Some(VenueKey::Journal("tse".into())));
/// assert_eq!(resolve("smith2023testing"), None);
/// ```
pub fn resolve(identifier: &str) -> Option<VenueKey> {
    [
        (VenueKind::Journal, &*JOURNAL_ID_REGEX),
        (VenueKind::Conference, &*CONFERENCE_ID_REGEX),
    ]
    .into_iter()
    .find_map(|(kind, regex)| {
        regex
            .captures(identifier)
            .map(|caps| VenueKey::new(kind, &caps[1]))
    })
}

#[derive(Debug, Clone)]
struct IndexEntry {
    count: usize,
    venue_name: Option<String>,
}

/// Paper counts per venue key, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct VenueIndex {
    order: Vec<VenueKey>,
    entries: HashMap<VenueKey, IndexEntry>,
    unresolved: usize,
    total: usize,
}

impl VenueIndex {
    pub fn build(citations: &[Citation]) -> Self {
        let mut index = Self::default();
        for citation in citations {
            index.insert(citation);
        }
        debug!(
            venues = index.len(),
            unresolved = index.unresolved,
            "built venue index"
        );
        index
    }

    fn insert(&mut self, citation: &Citation) {
        self.total += 1;
        let Some(key) = resolve(&citation.id) else {
            self.unresolved += 1;
            return;
        };

        let name = citation.venue_name(key.kind());

        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.count += 1;
                if entry.venue_name.is_none() {
                    entry.venue_name = name.map(str::to_string);
                }
            }
            None => {
                self.order.push(key.clone());
                self.entries.insert(
                    key,
                    IndexEntry {
                        count: 1,
                        venue_name: name.map(str::to_string),
                    },
                );
            }
        }
    }

    /// Number of distinct venues.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Papers published at `key`; zero for unknown keys.
    pub fn count(&self, key: &VenueKey) -> usize {
        self.entries.get(key).map_or(0, |entry| entry.count)
    }

    /// First non-empty venue name seen in the records for `key`.
    pub fn venue_name(&self, key: &VenueKey) -> Option<&str> {
        self.entries.get(key)?.venue_name.as_deref()
    }

    /// Venue keys with their counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&VenueKey, usize)> {
        self.order.iter().map(|key| (key, self.count(key)))
    }

    /// Keys of the given kind, in first-seen order.
    pub fn keys_of_kind(&self, kind: VenueKind) -> impl Iterator<Item = &VenueKey> {
        self.order.iter().filter(move |key| key.kind() == kind)
    }

    /// Records whose identifier did not resolve to a venue.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// All records seen, resolved or not.
    pub fn total_papers(&self) -> usize {
        self.total
    }
}
