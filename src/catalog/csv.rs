//! Delimited-file reader shared by the catalog loaders.
//!
//! Catalog exports come with localized column headers, so each catalog
//! declares the fields it needs together with the header aliases that map to
//! them. Aliases compare case-insensitively after trimming, and callers may
//! override them or the delimiter.
//!
//! ```
//! use venuerank::catalog::ccf::CcfCatalog;
//!
//! let mut config = CcfCatalog::default_csv_config();
//! config
//!     .set_header_mapping("name", vec!["Venue".to_string()])
//!     .set_delimiter(b';');
//! let catalog = CcfCatalog::from_csv_str_with_config("Venue;Rank\nPattern Recognition;B", &config).unwrap();
//! assert_eq!(catalog.len(), 1);
//! ```

use crate::csv_crate::{ReaderBuilder, StringRecord};
use crate::{RankError, Result};
use std::collections::HashMap;

/// Header mappings and dialect for a catalog file.
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field name to accepted header aliases
    header_map: HashMap<String, Vec<String>>,
    delimiter: u8,
}

impl CsvConfig {
    /// Creates a configuration from `(field, aliases)` pairs.
    #[must_use]
    pub fn with_headers(headers: &[(&str, &[&str])]) -> Self {
        let mut config = Self {
            header_map: HashMap::new(),
            delimiter: b',',
        };
        for (field, aliases) in headers {
            config.header_map.insert(
                field.to_string(),
                aliases.iter().map(|s| s.to_string()).collect(),
            );
        }
        config
    }

    /// Replaces the aliases of `field`.
    pub fn set_header_mapping(&mut self, field: &str, aliases: Vec<String>) -> &mut Self {
        self.header_map.insert(field.to_string(), aliases);
        self
    }

    /// Sets the delimiter character
    pub fn set_delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Finds the field name for a given header
    fn get_field_for_header(&self, header: &str) -> Option<&str> {
        let header = header.trim().trim_start_matches('\u{feff}').to_lowercase();
        self.header_map
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a.trim().to_lowercase() == header))
            .map(|(field, _)| field.as_str())
    }
}

/// One catalog row, keyed by field name.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawCatalogRow {
    fields: HashMap<String, String>,
    /// 1-based line of the record, for log messages
    pub(crate) line_number: usize,
}

impl RawCatalogRow {
    fn from_record(columns: &[Option<String>], record: &StringRecord, line_number: usize) -> Self {
        let fields = columns
            .iter()
            .zip(record.iter())
            .filter_map(|(field, value)| {
                let field = field.as_ref()?;
                let value = value.trim();
                (!value.is_empty()).then(|| (field.clone(), value.to_string()))
            })
            .collect();
        Self { fields, line_number }
    }

    /// Value of `field`, empty when the column is absent or blank.
    pub(crate) fn get(&self, field: &str) -> &str {
        self.fields.get(field).map_or("", String::as_str)
    }

    fn has_content(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// Reads every non-blank row of `input`.
///
/// # Errors
///
/// Returns [`RankError::MissingColumn`] if a field in `required` has no
/// matching header, or [`RankError::InvalidFormat`] for malformed CSV.
pub(crate) fn read_rows(input: &str, config: &CsvConfig, required: &[&str]) -> Result<Vec<RawCatalogRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let columns: Vec<Option<String>> = reader
        .headers()?
        .iter()
        .map(|header| config.get_field_for_header(header).map(str::to_string))
        .collect();

    for field in required {
        if !columns.iter().flatten().any(|column| column == field) {
            return Err(RankError::MissingColumn(field.to_string()));
        }
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let line_number = record.position().map_or(i + 2, |p| p.line() as usize);
        let row = RawCatalogRow::from_record(&columns, &record, line_number);
        if row.has_content() {
            rows.push(row);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADERS: &[(&str, &[&str])] = &[("name", &["刊物名称", "name"]), ("url", &["网址", "url"])];

    #[test]
    fn test_reads_aliased_headers() {
        let input = "\u{feff}刊物名称,网址,备注\nPattern Recognition , https://dblp.org/db/journals/pr/,x\n,,\n";
        let rows = read_rows(input, &CsvConfig::with_headers(HEADERS), &["name"]).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), "Pattern Recognition");
        assert_eq!(rows[0].get("url"), "https://dblp.org/db/journals/pr/");
        assert_eq!(rows[0].get("备注"), "");
        assert_eq!(rows[0].line_number, 2);
    }

    #[test]
    fn test_header_aliases_ignore_case() {
        let rows = read_rows("NAME,URL\nTSE,u\n", &CsvConfig::with_headers(HEADERS), &["name", "url"]).unwrap();
        assert_eq!(rows[0].get("name"), "TSE");
    }

    #[test]
    fn test_missing_required_column() {
        let result = read_rows("Title,Link\nx,y\n", &CsvConfig::with_headers(HEADERS), &["name"]);
        assert!(matches!(result, Err(RankError::MissingColumn(field)) if field == "name"));
    }

    #[test]
    fn test_custom_mapping_and_delimiter() {
        let mut config = CsvConfig::with_headers(HEADERS);
        config
            .set_header_mapping("name", vec!["Venue".to_string()])
            .set_delimiter(b'\t');
        let rows = read_rows("Venue\turl\nICSE\thttps://dblp.org/db/conf/icse/\n", &config, &["name"]).unwrap();
        assert_eq!(rows[0].get("name"), "ICSE");
        assert_eq!(rows[0].get("url"), "https://dblp.org/db/conf/icse/");
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let rows = read_rows("name,url\nOnly Name\n", &CsvConfig::with_headers(HEADERS), &["name"]).unwrap();
        assert_eq!(rows[0].get("name"), "Only Name");
        assert_eq!(rows[0].get("url"), "");
    }
}
