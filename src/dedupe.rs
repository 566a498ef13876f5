//! Two-stage bibliography deduplicator.
//!
//! Scholar profiles routinely list the same paper more than once: an exact
//! re-export, or an arXiv preprint next to its published version. Both are
//! collapsed here before any counting happens.
//!
//! ## Stages
//!
//! 1. **Exact**: records identical across title, year, authors, journal and
//!    booktitle are collapsed, keeping the first occurrence.
//! 2. **Same title**: among records sharing a title, the first one whose
//!    journal is not the preprint marker (`CoRR` by default) is kept. When every
//!    version is a preprint, the first is kept.
//!
//! Output follows the first appearance of each title. Untitled records are
//! never grouped with one another in stage 2.
//!
//! ## Usage
//!
//! ```rust
//! use venuerank::{dedupe::Deduplicator, Citation};
//!
//! let citations = vec![
//!     Citation {
//!         id: "DBLP:journals/corr/abs-2101-00001".to_string(),
//!         title: "Deep Testing".to_string(),
//!         journal: Some("CoRR".to_string()),
//!         ..Default::default()
//!     },
//!     Citation {
//!         id: "DBLP:journals/tse/Smith23".to_string(),
//!         title: "Deep Testing".to_string(),
//!         journal: Some("IEEE Trans. Software Eng.".to_string()),
//!         ..Default::default()
//!     },
//! ];
//!
//! let deduplicator = Deduplicator::new();
//! let kept = deduplicator.deduplicate(citations);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].id, "DBLP:journals/tse/Smith23");
//! ```
//!
//! To inspect what was dropped, [`Deduplicator::find_duplicates`] returns one
//! [`DuplicateGroup`] per retained record.

use crate::config::DedupeConfig;
use crate::{Citation, DuplicateGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Configuration options for the deduplicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeduplicatorConfig {
    /// Journal name marking a preprint version
    pub preprint_marker: String,
}

impl Default for DeduplicatorConfig {
    fn default() -> Self {
        Self {
            preprint_marker: "CoRR".to_string(),
        }
    }
}

impl From<&DedupeConfig> for DeduplicatorConfig {
    fn from(config: &DedupeConfig) -> Self {
        Self {
            preprint_marker: config.preprint_marker.clone(),
        }
    }
}

/// How many records each stage removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeReport {
    pub input_count: usize,
    /// Removed as exact copies
    pub exact_removed: usize,
    /// Removed as other versions of the same title
    pub title_removed: usize,
    pub output_count: usize,
}

/// Fields compared in stage 1.
type ExactKey<'a> = (&'a str, Option<&'a str>, &'a [String], Option<&'a str>, Option<&'a str>);

fn exact_key(citation: &Citation) -> ExactKey<'_> {
    (
        citation.title.as_str(),
        citation.year.as_deref(),
        citation.authors.as_slice(),
        citation.journal.as_deref(),
        citation.booktitle.as_deref(),
    )
}

/// Index-level outcome shared by every public entry point.
#[derive(Debug, Default)]
struct Plan {
    /// Retained index with the indices it absorbed, in output order
    groups: Vec<(usize, Vec<usize>)>,
    report: DedupeReport,
}

#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    config: DeduplicatorConfig,
}

impl Deduplicator {
    /// Creates a new Deduplicator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Deduplicator with custom configuration.
    #[must_use]
    pub fn with_config(mut self, config: DeduplicatorConfig) -> Self {
        self.config = config;
        self
    }

    fn is_preprint(&self, citation: &Citation) -> bool {
        citation
            .journal
            .as_deref()
            .is_some_and(|journal| journal.trim() == self.config.preprint_marker)
    }

    fn plan(&self, citations: &[Citation]) -> Plan {
        // Stage 1: exact copies fold into their first occurrence
        let mut first_seen: HashMap<ExactKey<'_>, usize> = HashMap::new();
        let mut exact_copies: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut survivors = Vec::new();
        for (i, citation) in citations.iter().enumerate() {
            match first_seen.get(&exact_key(citation)) {
                Some(&first) => exact_copies.entry(first).or_default().push(i),
                None => {
                    first_seen.insert(exact_key(citation), i);
                    survivors.push(i);
                }
            }
        }

        // Stage 2: group survivors by title in first-appearance order
        let mut title_slots: HashMap<&str, usize> = HashMap::new();
        let mut title_groups: Vec<Vec<usize>> = Vec::new();
        for &i in &survivors {
            let title = citations[i].title.trim();
            if title.is_empty() {
                title_groups.push(vec![i]);
                continue;
            }
            match title_slots.get(title) {
                Some(&slot) => title_groups[slot].push(i),
                None => {
                    title_slots.insert(title, title_groups.len());
                    title_groups.push(vec![i]);
                }
            }
        }

        let mut plan = Plan::default();
        for members in title_groups {
            let keep = members
                .iter()
                .copied()
                .find(|&i| !self.is_preprint(&citations[i]))
                .unwrap_or(members[0]);
            if members.len() > 1 {
                debug!(
                    title = %citations[keep].title,
                    kept = %citations[keep].id,
                    dropped = members.len() - 1,
                    "collapsed same-title records"
                );
            }
            plan.report.title_removed += members.len() - 1;

            let mut absorbed: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&i| i != keep)
                .chain(
                    members
                        .iter()
                        .flat_map(|i| exact_copies.get(i).into_iter().flatten().copied()),
                )
                .collect();
            absorbed.sort_unstable();
            plan.groups.push((keep, absorbed));
        }

        plan.report.input_count = citations.len();
        plan.report.exact_removed = citations.len() - survivors.len();
        plan.report.output_count = plan.groups.len();
        plan
    }

    /// Removes duplicates, returning the retained records and the per-stage
    /// counts.
    pub fn deduplicate_with_report(&self, citations: Vec<Citation>) -> (Vec<Citation>, DedupeReport) {
        let plan = self.plan(&citations);
        let report = plan.report;

        let mut slots: Vec<Option<Citation>> = citations.into_iter().map(Some).collect();
        let kept = plan
            .groups
            .iter()
            .filter_map(|(keep, _)| slots[*keep].take())
            .collect();

        info!(
            input = report.input_count,
            exact_removed = report.exact_removed,
            title_removed = report.title_removed,
            output = report.output_count,
            "deduplicated records"
        );
        (kept, report)
    }

    /// Removes duplicates, keeping output in first-appearance order of titles.
    pub fn deduplicate(&self, citations: Vec<Citation>) -> Vec<Citation> {
        self.deduplicate_with_report(citations).0
    }

    /// Groups every record under the record retained in its place.
    ///
    /// One group is returned per retained record, in output order; records
    /// without duplicates come back with an empty `duplicates` list.
    pub fn find_duplicates(&self, citations: &[Citation]) -> Vec<DuplicateGroup> {
        self.plan(citations)
            .groups
            .into_iter()
            .map(|(keep, absorbed)| DuplicateGroup {
                unique: citations[keep].clone(),
                duplicates: absorbed.into_iter().map(|i| citations[i].clone()).collect(),
            })
            .collect()
    }
}
