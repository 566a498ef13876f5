//! ISSN extraction, validation and normalization.
//!
//! An ISSN is eight characters, `DDDD-DDDC`, where the check character `C` is
//! a digit or `X`. The check character is derived from the first seven digits
//! weighted 8 down to 2, summed and taken modulo 11.
//!
//! ```
//! use venuerank::issn;
//!
//! assert!(issn::validate("0028-0836"));
//! assert_eq!(issn::normalize("00280836").as_deref(), Some("0028-0836"));
//! ```

use crate::regex::Regex;
use itertools::Itertools;
use std::sync::LazyLock;

static ISSN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{3}[\dXx]\b").unwrap());

static ISSN_SHAPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{3}[\dXx]$").unwrap());

/// Finds every ISSN-shaped token in `text`.
///
/// Tokens are de-duplicated and returned in order of first occurrence. No
/// checksum validation is performed here.
pub fn extract(text: &str) -> Vec<String> {
    ISSN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .unique()
        .collect()
}

/// Computes the check character for the seven significant digits.
fn check_character(digits: &[u32]) -> char {
    let sum: u32 = digits
        .iter()
        .zip((2..=8).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();

    match sum % 11 {
        0 => '0',
        1 => 'X',
        remainder => char::from_digit(11 - remainder, 10).unwrap_or('?'),
    }
}

/// Validates the shape and check character of an ISSN in `DDDD-DDDC` form.
pub fn validate(issn: &str) -> bool {
    if !ISSN_SHAPE_REGEX.is_match(issn) {
        return false;
    }

    let digits: Vec<u32> = issn
        .chars()
        .filter(|c| *c != '-')
        .take(7)
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != 7 {
        return false;
    }

    issn.chars()
        .last()
        .is_some_and(|last| last.to_ascii_uppercase() == check_character(&digits))
}

/// Normalizes an ISSN to `DDDD-DDDC` with an upper-case `X`.
///
/// Everything except digits and `X` is dropped first. Returns `None` when the
/// remainder is not eight characters long or fails the checksum.
pub fn normalize(issn: &str) -> Option<String> {
    let cleaned: String = issn
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if cleaned.len() != 8 {
        return None;
    }

    let formatted = format!("{}-{}", &cleaned[..4], &cleaned[4..]);
    validate(&formatted).then_some(formatted)
}

/// Extracts every ISSN in `text` that survives normalization.
pub fn extract_normalized(text: &str) -> Vec<String> {
    extract(text)
        .iter()
        .filter_map(|candidate| normalize(candidate))
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("0028-0836", true)] // Nature
    #[case("0028-0837", false)]
    #[case("0098-5589", true)] // IEEE TSE
    #[case("1939-3520", true)] // IEEE TSE (online)
    #[case("2049-3630", true)]
    #[case("0000-006X", true)]
    #[case("0000-006x", true)]
    #[case("0000-0060", false)]
    #[case("00280836", false)]
    #[case("0028-083", false)]
    #[case("", false)]
    fn test_validate(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(validate(input), expected, "validate({input:?})");
    }

    #[rstest]
    #[case("00280836", Some("0028-0836"))]
    #[case("0028-0836", Some("0028-0836"))]
    #[case("ISSN 0028 0836", Some("0028-0836"))]
    #[case("0000006x", Some("0000-006X"))]
    #[case("0028-0837", None)]
    #[case("0028-08361", None)]
    #[case("1234", None)]
    #[case("", None)]
    fn test_normalize(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize(input).as_deref(), expected);
    }

    #[test]
    fn test_extract_deduplicates_in_order() {
        let text = "<li>ISSN: 0098-5589</li><li>EISSN: 1939-3520</li><meta content=\"0098-5589\">";
        assert_eq!(extract(text), vec!["0098-5589".to_string(), "1939-3520".to_string()]);
    }

    #[test]
    fn test_extract_ignores_longer_digit_runs() {
        assert_eq!(extract("phone 12345-6789 or 1234-56789"), Vec::<String>::new());
        assert_eq!(extract(""), Vec::<String>::new());
    }

    #[test]
    fn test_extract_normalized_drops_bad_checksums() {
        let text = "0028-0836 0028-0837 0000-006x";
        assert_eq!(
            extract_normalized(text),
            vec!["0028-0836".to_string(), "0000-006X".to_string()]
        );
    }
}
