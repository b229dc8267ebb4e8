pub mod config;
pub mod data;
pub mod directory;
pub mod dom;
pub mod evtol;
pub mod extract;
pub mod fetch;
pub mod frame;
pub mod harvest;
pub mod hygiene;
pub mod persistent;
pub mod transportup;

mod error;

pub use data::{Record, Table, Value};
pub use directory::{Directory, DirectoryEntry};
pub use dom::Document;
pub use error::{CrawlerError, ExtractError, FetchError};
pub use fetch::{Fetcher, HttpFetcher};
pub use frame::Frame;
pub use harvest::{check_updates, Delay, Harvester, MergeReport, UpdateStatus};

/// Site-specific record assembly over a fetched detail page.
pub trait Crawler {
    type Record: Record + Send;

    /// Field names accepted by [`Crawler::refresh`].
    fn fields(&self) -> &'static [&'static str];

    /// Runs every field rule for one page. Rules fall back to their
    /// sentinels individually, so this cannot fail.
    fn assemble(&self, entry: &DirectoryEntry, doc: &Document) -> Self::Record;

    /// Re-runs only the named rules, overwriting only those cells.
    fn refresh(&self, record: &mut Self::Record, fields: &[&str], doc: &Document);

    fn check_fields(&self, fields: &[&str]) -> Result<(), CrawlerError> {
        let expected = self.fields();
        match fields.iter().find(|f| !expected.iter().any(|e| *e == **f)) {
            Some(field) => Err(CrawlerError::UnknownField {
                field: field.to_string(),
                expected,
            }),
            None => Ok(()),
        }
    }
}
