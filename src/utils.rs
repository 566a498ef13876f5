use crate::regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static BRACED_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]*)\}").unwrap());

/// Cleans a BibTeX field value: collapses whitespace runs and unwraps
/// innermost `{...}` groups.
///
/// # Arguments
///
/// * `text` - The raw field value
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_REGEX.replace_all(text.trim(), " ");
    let mut result = collapsed.into_owned();
    // Nested braces unwrap one level per pass
    while BRACED_REGEX.is_match(&result) {
        result = BRACED_REGEX.replace_all(&result, "$1").into_owned();
    }
    result.trim().to_string()
}

/// Splits a BibTeX `author` field into individual names.
///
/// Names are separated by the keyword `and`; whitespace inside each name is
/// collapsed.
pub fn split_authors(authors: &str) -> Vec<String> {
    let collapsed = WHITESPACE_REGEX.replace_all(authors.trim(), " ");
    collapsed
        .split(" and ")
        .map(clean_text)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Formats a DOI string by removing URL and `doi:` prefixes
///
/// Everything before the first `10.` directory indicator is dropped.
///
/// # Arguments
///
/// * `doi_str` - The DOI string to format
pub fn format_doi(doi_str: &str) -> Option<String> {
    let doi = doi_str
        .trim()
        .replace(|c: char| c.is_whitespace(), "")
        .to_lowercase();

    let pos = doi.find("10.")?;
    Some(doi[pos..].to_string())
}

/// Returns `None` for empty strings.
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
