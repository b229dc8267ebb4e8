use crate::data::Value;
use crate::frame::Frame;
use crate::CrawlerError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A detail-page link and the listing section it was found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(alias = "links")]
    pub link: String,
    pub category: String,
    #[serde(default, alias = "ac_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DirectoryEntry {
    pub fn new<L: Into<String>, C: Into<String>>(link: L, category: C) -> Self {
        Self {
            link: link.into(),
            category: category.into(),
            name: None,
        }
    }

    pub fn named<N: Into<String>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Ordered, link-unique list of directory entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// Keeps the first entry for every link; later duplicates are dropped.
    pub fn from_entries<I: IntoIterator<Item = DirectoryEntry>>(entries: I) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.link.clone()))
            .collect();
        Self { entries }
    }

    /// Loads an externally maintained directory, e.g. rows with
    /// `link`, `category` and `ac_name`.
    pub fn from_json(json: &str) -> Result<Self, CrawlerError> {
        let entries: Vec<DirectoryEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DirectoryEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// `links` / `category` view, row index 0..n-1.
    pub fn to_frame(&self) -> Frame {
        Frame::from_cells(self.entries.iter().map(|e| {
            vec![
                ("links".to_string(), Value::text(&e.link)),
                ("category".to_string(), Value::text(&e.category)),
            ]
        }))
    }
}

impl<'de> Deserialize<'de> for Directory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<DirectoryEntry>::deserialize(deserializer).map(Directory::from_entries)
    }
}
