//! Positive-only venue metadata cache.
//!
//! Maps a DBLP journal abbreviation to the title and ISSNs found on its DBLP
//! page. Only successful lookups are ever stored, so a transient network
//! failure is retried on the next run instead of being remembered.
//!
//! The backing file is a JSON object:
//!
//! ```json
//! {
//!   "tse": {
//!     "title": "IEEE Transactions on Software Engineering",
//!     "issn_list": ["0098-5589", "1939-3520"],
//!     "success": true
//!   }
//! }
//! ```

use crate::fetch::VenueFetcher;
use crate::{Result, issn};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static H1_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// Title and ISSNs of a journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueMetadata {
    #[serde(default)]
    pub title: Option<String>,
    /// Normalized ISSNs, de-duplicated
    #[serde(default)]
    pub issn_list: Vec<String>,
    #[serde(default)]
    pub success: bool,
}

impl VenueMetadata {
    /// An unsuccessful lookup.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Reduces raw page content to its title and ISSNs.
    ///
    /// The title is the text of the first `<h1>`, or failing that the
    /// `<title>` with a leading `dblp:` removed. The lookup counts as
    /// successful if either a title or an ISSN was found.
    pub fn from_page(content: &str) -> Self {
        let title = extract_title(content);
        let issn_list = issn::extract_normalized(content);
        let success = title.is_some() || !issn_list.is_empty();
        Self {
            title,
            issn_list,
            success,
        }
    }
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

fn extract_title(content: &str) -> Option<String> {
    if content.trim().is_empty() {
        return None;
    }
    let document = Html::parse_document(content);

    let heading = document
        .select(&H1_SELECTOR)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty());
    if heading.is_some() {
        return heading;
    }

    document.select(&TITLE_SELECTOR).next().and_then(|element| {
        let text = element_text(element);
        let text = match text.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("dblp:") => text[5..].trim_start(),
            _ => text.as_str(),
        };
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// Abbreviation-keyed metadata cache, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct VenueCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, VenueMetadata>,
}

impl VenueCache {
    /// A cache with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the cache file at `path`.
    ///
    /// A missing, unreadable or corrupt file yields an empty cache. Failed
    /// entries left by older writers are purged, and the file is rewritten if
    /// any were.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = if path.exists() {
            load_entries(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable venue cache");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        let mut cache = Self {
            path: Some(path),
            entries,
        };
        if cache.purge_failed() > 0 {
            if let Err(e) = cache.flush() {
                warn!(error = %e, "failed to rewrite purged venue cache");
            }
        }
        cache
    }

    /// Removes every unsuccessful entry, returning how many were removed.
    pub fn purge_failed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, metadata| metadata.success);
        let purged = before - self.entries.len();
        if purged > 0 {
            info!(purged, "purged failed venue cache entries");
        }
        purged
    }

    /// Returns metadata for `abbr`, fetching it when no successful entry is
    /// cached.
    ///
    /// A successful fetch is stored and written through to disk; a failed one
    /// is returned but leaves the cache untouched.
    pub fn get<F>(&mut self, abbr: &str, fetcher: &F) -> VenueMetadata
    where
        F: VenueFetcher + ?Sized,
    {
        if let Some(cached) = self.entries.get(abbr).filter(|metadata| metadata.success) {
            debug!(abbr, "venue cache hit");
            return cached.clone();
        }

        let metadata = match fetcher.fetch(abbr) {
            Ok(content) => VenueMetadata::from_page(&content),
            Err(e) => {
                warn!(abbr, error = %e, "failed to fetch venue page");
                return VenueMetadata::failed();
            }
        };

        if !metadata.success {
            warn!(abbr, "venue page had neither title nor ISSN");
            return metadata;
        }

        self.entries.insert(abbr.to_string(), metadata.clone());
        if let Err(e) = self.flush() {
            warn!(abbr, error = %e, "failed to persist venue cache");
        }
        metadata
    }

    /// Cached entry for `abbr`, if any.
    pub fn peek(&self, abbr: &str) -> Option<&VenueMetadata> {
        self.entries.get(abbr)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the cache to its backing file as pretty-printed JSON.
    ///
    /// Parent directories are created as needed. A no-op for in-memory
    /// caches.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, VenueMetadata>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
