use crate::data::{Record, Table};
use crate::directory::{Directory, DirectoryEntry};
use crate::dom::Document;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::{Crawler, CrawlerError};
use chrono::{DateTime, Local};
use std::fmt;
use std::ops::Range;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    min: Duration,
    max: Duration,
}

impl Delay {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn sample(&self) -> Duration {
        let span = (self.max - self.min).as_millis() as u64;
        self.min + Duration::from_millis(fastrand::u64(0..=span))
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(10))
    }
}

#[derive(Debug)]
pub struct MergeReport {
    /// Refreshed links, for a bulk backfill.
    pub appended: Vec<String>,
    pub skipped: Vec<String>,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub stopped_early: Option<FetchError>,
}

impl MergeReport {
    fn start() -> Self {
        let now = Local::now();
        Self {
            appended: vec![],
            skipped: vec![],
            started: now,
            finished: now,
            stopped_early: None,
        }
    }

    fn finish(mut self) -> Self {
        self.finished = Local::now();
        self
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished - self.started
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Behind(usize),
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::UpToDate => write!(f, "Your table is up to date. No update needed."),
            UpdateStatus::Behind(n) => write!(f, "NOT up to date. {} new aircraft exist", n),
        }
    }
}

pub fn check_updates(directory_len: usize, table_len: usize) -> UpdateStatus {
    match directory_len.saturating_sub(table_len) {
        0 => UpdateStatus::UpToDate,
        n => UpdateStatus::Behind(n),
    }
}

pub struct Harvester<C, F> {
    crawler: C,
    fetcher: F,
    delay: Delay,
    last_request: Option<Instant>,
}

impl<C, F> Harvester<C, F>
where
    C: Crawler,
    F: Fetcher,
{
    pub fn new(crawler: C, fetcher: F, delay: Delay) -> Self {
        Self {
            crawler,
            fetcher,
            delay,
            last_request: None,
        }
    }

    pub fn crawler(&self) -> &C {
        &self.crawler
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn fetch(&mut self, url: &str) -> Result<Document, FetchError> {
        if let Some(last_request) = self.last_request.take() {
            let wait = self.delay.sample();
            let since = Instant::now().duration_since(last_request);
            if since < wait {
                tokio::time::sleep(wait - since).await;
            }
        }

        let result = self.fetcher.fetch(url).await;
        self.last_request.replace(Instant::now());
        result
    }

    /// Pages that fail to load are skipped and stay new for the next run;
    /// an unreachable site stops the run.
    pub async fn merge(
        &mut self,
        table: &mut Table<C::Record>,
        directory: &Directory,
        range: Option<Range<usize>>,
    ) -> MergeReport {
        let mut report = MergeReport::start();

        let end = range
            .as_ref()
            .map_or(directory.len(), |r| r.end.min(directory.len()));
        let start = range.map_or(0, |r| r.start.min(end));

        let new_entries: Vec<(usize, &DirectoryEntry)> = directory.entries()[start..end]
            .iter()
            .enumerate()
            .map(|(i, entry)| (start + i, entry))
            .filter(|(_, entry)| !table.is_exist(&entry.link))
            .collect();

        info!(
            "{} new of {} directory entries in [{}, {})",
            new_entries.len(),
            end - start,
            start,
            end
        );

        for (index, entry) in new_entries {
            let doc = match self.fetch(&entry.link).await {
                Ok(doc) => doc,
                Err(e) if e.is_fatal() => {
                    warn!(index, link = %entry.link, error = %e, "Stopping early");
                    report.stopped_early = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(index, link = %entry.link, error = %e, "Skipping page");
                    report.skipped.push(entry.link.clone());
                    continue;
                }
            };

            let record = self.crawler.assemble(entry, &doc);
            match table.insert(record) {
                Ok(()) => {
                    report.appended.push(entry.link.clone());
                    info!("[{}] Insert Result {}", report.appended.len(), entry.link);
                }
                Err(e) => {
                    warn!(index, link = %entry.link, error = %e, "Skipping row");
                    report.skipped.push(entry.link.clone());
                }
            }
        }

        let report = report.finish();
        if report.appended.is_empty() {
            info!("Nothing was updated");
        } else {
            info!(
                "Added {} new aircraft in {}s",
                report.appended.len(),
                report.elapsed().num_seconds()
            );
        }
        report
    }

    /// Link and field names are checked before anything is fetched.
    pub async fn backfill(
        &mut self,
        table: &mut Table<C::Record>,
        link: &str,
        fields: &[&str],
    ) -> Result<(), CrawlerError> {
        if !table.is_exist(link) {
            return Err(CrawlerError::UnknownLink(link.to_string()));
        }
        self.crawler.check_fields(fields)?;

        let doc = self.fetch(link).await?;
        let record = table
            .get_mut(link)
            .ok_or_else(|| CrawlerError::UnknownLink(link.to_string()))?;
        self.crawler.refresh(record, fields, &doc);
        debug!(link, ?fields, "Backfilled");
        Ok(())
    }

    pub async fn backfill_missing(
        &mut self,
        table: &mut Table<C::Record>,
        fields: &[&str],
    ) -> Result<MergeReport, CrawlerError> {
        self.crawler.check_fields(fields)?;

        let targets: Vec<String> = table
            .iter()
            .filter(|record| fields.iter().any(|f| record.is_missing(f)))
            .map(|record| record.link().to_string())
            .collect();
        info!("{} rows to backfill for {:?}", targets.len(), fields);

        let mut report = MergeReport::start();
        for (index, link) in targets.into_iter().enumerate() {
            match self.backfill(table, &link, fields).await {
                Ok(()) => {
                    info!("[{}] Backfill Result {}", report.appended.len() + 1, link);
                    report.appended.push(link);
                }
                Err(CrawlerError::Fetch(e)) if e.is_fatal() => {
                    warn!(index, %link, error = %e, "Stopping early");
                    report.stopped_early = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(index, %link, error = %e, "Skipping row");
                    report.skipped.push(link);
                }
            }
        }

        let report = report.finish();
        if report.appended.is_empty() {
            info!("Nothing was updated");
        }
        Ok(report)
    }
}
