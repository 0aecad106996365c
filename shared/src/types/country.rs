//! Country dialing codes bundled with the client

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const BUNDLED_COUNTRY_CODES: &str = include_str!("../../data/country_codes.json");

static BUNDLED_CATALOG: Lazy<CountryCatalog> =
    Lazy::new(|| CountryCatalog::from_json(BUNDLED_COUNTRY_CODES).unwrap_or_default());

/// One selectable country in the dial-code picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCodeEntry {
    /// Display name, e.g. "United Kingdom"
    pub name: String,
    /// Dial code including the leading `+`, e.g. "+44"
    pub dial_code: String,
    /// ISO 3166-1 alpha-2 code, e.g. "GB"
    pub code: String,
    /// Text matched by searches
    pub search: String,
}

/// Read-only list of country codes
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    entries: Vec<CountryCodeEntry>,
}

impl CountryCatalog {
    /// The catalog compiled into the binary, parsed once per process
    pub fn bundled() -> &'static CountryCatalog {
        &BUNDLED_CATALOG
    }

    /// Parse a catalog from a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CountryCodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose search key contains `query`, ignoring case.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&CountryCodeEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.search.to_lowercase().contains(&needle))
            .collect()
    }

    /// First entry with the given dial code; several countries can share one
    pub fn find_by_dial_code(&self, dial_code: &str) -> Option<&CountryCodeEntry> {
        let wanted = dial_code.trim().trim_start_matches('+');
        self.entries
            .iter()
            .find(|entry| entry.dial_code.trim_start_matches('+') == wanted)
    }

    pub fn find_by_iso_code(&self, iso_code: &str) -> Option<&CountryCodeEntry> {
        self.entries
            .iter()
            .find(|entry| entry.code.eq_ignore_ascii_case(iso_code.trim()))
    }
}
