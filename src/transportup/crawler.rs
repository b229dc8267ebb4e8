use super::extract;
use super::TransportUpRecord;
use crate::extract::NA;
use crate::{Crawler, DirectoryEntry, Document};

pub const FIELDS: &[&str] = &["summary", "dev_stage", "references", "details"];

pub const SELF_DOMAIN: &str = "transportup";

#[derive(Debug, Clone)]
pub struct TransportUpCrawler {
    /// Reference links containing this are dropped.
    pub self_domain: String,
}

impl Default for TransportUpCrawler {
    fn default() -> Self {
        Self {
            self_domain: SELF_DOMAIN.to_string(),
        }
    }
}

impl Crawler for TransportUpCrawler {
    type Record = TransportUpRecord;

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn assemble(&self, entry: &DirectoryEntry, doc: &Document) -> Self::Record {
        TransportUpRecord {
            link: entry.link.clone(),
            category: entry.category.clone(),
            ac_name: entry.name.clone().unwrap_or_else(|| NA.to_string()),
            summary: extract::summary(doc),
            dev_stage: extract::dev_stage(doc),
            references: extract::references(doc, &self.self_domain),
            details: extract::details(doc),
        }
    }

    fn refresh(&self, record: &mut Self::Record, fields: &[&str], doc: &Document) {
        for field in fields {
            match *field {
                "summary" => record.summary = extract::summary(doc),
                "dev_stage" => record.dev_stage = extract::dev_stage(doc),
                "references" => record.references = extract::references(doc, &self.self_domain),
                "details" => record.details = extract::details(doc),
                other => tracing::warn!("Ignoring unknown field {}", other),
            }
        }
    }
}
