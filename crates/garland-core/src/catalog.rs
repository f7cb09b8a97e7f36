//! Content catalog and passphrase table loading.
//!
//! Ornaments and passphrases ship as two JSON files aligned by index. Both
//! loaders degrade to empty data on any failure so the calendar still renders
//! when a source is missing or malformed. `Catalog::assemble` pairs the two
//! sequences into one record per ornament at load time, which keeps sparse or
//! short passphrase tables from drifting out of alignment later.

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Media attachment carried by an ornament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Media {
    Image { src: String, alt: Option<String> },
    Video { src: String, alt: Option<String> },
}

impl Media {
    pub fn src(&self) -> &str {
        match self {
            Media::Image { src, .. } | Media::Video { src, .. } => src,
        }
    }

    pub fn alt(&self) -> Option<&str> {
        match self {
            Media::Image { alt, .. } | Media::Video { alt, .. } => alt.as_deref(),
        }
    }
}

/// One dated content item in the calendar.
///
/// Index position within the catalog is the only stable identity; there is no
/// separate id field. The sequence is assumed ascending by `date`, though the
/// gate engine only ever compares dates pointwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ornament {
    pub date: NaiveDate,
    pub year: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub passphrase_hint: Option<String>,

    #[serde(default)]
    pub media: Option<Media>,
}

/// One catalog entry: an ornament paired with its expected passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub ornament: Ornament,
    passphrase: Option<String>,
}

impl CatalogEntry {
    /// Expected passphrase for this entry, when one is available.
    ///
    /// Empty strings count as "not yet available", matching the unlock rule.
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref().filter(|p| !p.is_empty())
    }
}

/// Ornaments zipped with their index-aligned passphrases.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Pair ornaments with passphrases by position.
    ///
    /// A table shorter than the catalog leaves the tail entries without a
    /// passphrase; a longer table is truncated.
    pub fn assemble(ornaments: Vec<Ornament>, mut passphrases: Vec<String>) -> Self {
        if passphrases.len() > ornaments.len() {
            warn!(
                "passphrase table has {} entries for {} ornaments; ignoring extras",
                passphrases.len(),
                ornaments.len()
            );
            passphrases.truncate(ornaments.len());
        }

        let mut table = passphrases.into_iter().map(Some).collect::<Vec<_>>();
        table.resize(ornaments.len(), None);

        let entries = ornaments
            .into_iter()
            .zip(table)
            .map(|(ornament, passphrase)| CatalogEntry {
                ornament,
                passphrase,
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ornament(&self, index: usize) -> Option<&Ornament> {
        self.entries.get(index).map(|entry| &entry.ornament)
    }

    pub fn passphrase(&self, index: usize) -> Option<&str> {
        self.entries.get(index).and_then(CatalogEntry::passphrase)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}

/// Load the ornament sequence, degrading to empty on any failure.
pub fn load_ornaments(path: &Path) -> Vec<Ornament> {
    load_json_sequence(path, "ornament catalog")
}

/// Load the passphrase table, degrading to empty on any failure.
pub fn load_passphrases(path: &Path) -> Vec<String> {
    load_json_sequence(path, "passphrase table")
}

fn load_json_sequence<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Vec<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("{what} unavailable at {}: {err}", path.display());
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("{what} at {} is malformed: {err}", path.display());
            Vec::new()
        }
    }
}

/// Render a date the way the calendar displays it (MM/DD/YYYY).
pub fn display_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}
