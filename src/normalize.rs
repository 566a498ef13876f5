//! Venue name normalization.
//!
//! Catalog rows and bibliography entries spell the same venue differently
//! ("The Journal of X", "journal of x.", "IEEE X"). Both sides are reduced to
//! a canonical form before comparison:
//!
//! 1. lowercase
//! 2. strip at most one leading stop-phrase, the first of the list that matches
//! 3. replace every character that is neither alphanumeric nor whitespace with a space
//! 4. collapse whitespace runs and trim
//!
//! ```
//! use venuerank::normalize::{normalize_name, PrefixSet};
//!
//! assert_eq!(
//!     normalize_name("The Journal of ACM Transactions", PrefixSet::Journal),
//!     "journal of acm transactions"
//! );
//! ```

/// Stop-phrases stripped from journal names, in scan order.
pub const JOURNAL_PREFIXES: &[&str] = &["the ", "journal of ", "proceedings of ", "ieee ", "acm "];

/// Stop-phrases stripped from general publication names (journals and
/// conferences), in scan order.
pub const PUBLICATION_PREFIXES: &[&str] = &[
    "the ",
    "journal of ",
    "proceedings of ",
    "ieee ",
    "acm ",
    "international conference on ",
    "conference on ",
    "workshop on ",
];

/// Which stop-phrase list applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSet {
    /// Journal-only context (CAS catalog).
    Journal,
    /// Journal and conference context (CCF catalog).
    Publication,
}

impl PrefixSet {
    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            PrefixSet::Journal => JOURNAL_PREFIXES,
            PrefixSet::Publication => PUBLICATION_PREFIXES,
        }
    }
}

/// Normalizes a venue name for comparison.
pub fn normalize_name(name: &str, prefixes: PrefixSet) -> String {
    let lowered = name.to_lowercase();

    let stripped = prefixes
        .prefixes()
        .iter()
        .find_map(|prefix| lowered.strip_prefix(prefix))
        .unwrap_or(&lowered);

    let spaced: String = stripped
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if two names are equal after normalization.
pub fn names_equal(a: &str, b: &str, prefixes: PrefixSet) -> bool {
    normalize_name(a, prefixes) == normalize_name(b, prefixes)
}
