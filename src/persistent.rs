//! JSON files for tables and directories.

use crate::data::{Record, Table};
use crate::CrawlerError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Loads a table, or starts an empty one when the file does not exist yet.
pub fn load_table<R, P>(path: P) -> Result<Table<R>, CrawlerError>
where
    R: Record + DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        debug!("{} does not exist, starting an empty table", path.display());
        return Ok(Table::new());
    }
    let raw = std::fs::read_to_string(path)?;
    let table: Table<R> = serde_json::from_str(&raw)?;
    debug!("Loaded {} rows from {}", table.count(), path.display());
    Ok(table)
}

pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, CrawlerError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Writes through a sibling temp file so an interrupted save leaves the
/// previous file intact.
pub fn save_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<(), CrawlerError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    std::fs::rename(&tmp, path)?;
    debug!("Saved {}", path.display());
    Ok(())
}
