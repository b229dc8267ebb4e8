use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use vtol_directory_crawler::config::Config;
use vtol_directory_crawler::evtol::{self, AircraftRecord};
use vtol_directory_crawler::persistent::{load_json, load_table, save_json};
use vtol_directory_crawler::transportup::TransportUpRecord;
use vtol_directory_crawler::{
    check_updates, hygiene, Crawler, CrawlerError, Directory, Fetcher, Frame, Harvester,
    HttpFetcher, MergeReport, Record, Table,
};

#[derive(Debug, Parser)]
#[command(name = "vtol-directory-crawler", about = "Harvest aircraft directories into JSON tables.")]
struct Cli {
    /// JSON config file; absent keys take their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Site {
    Evtol,
    Transportup,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape the evtol.news listing into a directory file.
    EvtolDirectory {
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Append aircraft missing from the evtol.news table.
    EvtolUpdate {
        #[arg(long)]
        table: PathBuf,
        /// Saved directory to use instead of scraping the listing again.
        #[arg(long)]
        directory: Option<PathBuf>,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        stop: Option<usize>,
    },
    /// Append aircraft missing from the transportup.com table.
    TransportupUpdate {
        #[arg(long)]
        table: PathBuf,
        #[arg(long)]
        directory: PathBuf,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        stop: Option<usize>,
        /// Apply the configured default stage to rows without one.
        #[arg(long)]
        fill_stage: bool,
    },
    /// Re-extract fields of one row, or of every row missing them.
    Backfill {
        #[arg(value_enum)]
        site: Site,
        #[arg(long)]
        table: PathBuf,
        #[arg(long)]
        link: Option<String>,
        #[arg(long, required = true, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Compare a table against its directory and report missing values.
    Check {
        #[arg(value_enum)]
        site: Site,
        #[arg(long)]
        table: PathBuf,
        #[arg(long)]
        directory: Option<PathBuf>,
    },
    /// Export a cleaned frame: derived columns added, sparse columns dropped.
    Prune {
        #[arg(value_enum)]
        site: Site,
        #[arg(long)]
        table: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, default_value_t = 0.75)]
        threshold: f64,
    },
}

fn range(start: Option<usize>, stop: Option<usize>) -> Option<std::ops::Range<usize>> {
    match (start, stop) {
        (None, None) => None,
        (start, stop) => Some(start.unwrap_or(0)..stop.unwrap_or(usize::MAX)),
    }
}

fn log_report(report: &MergeReport) {
    info!(
        "Appended {}, skipped {}, started {}, finished {}",
        report.appended.len(),
        report.skipped.len(),
        report.started.format("%Y-%m-%d %H:%M:%S"),
        report.finished.format("%Y-%m-%d %H:%M:%S"),
    );
    if let Some(e) = &report.stopped_early {
        warn!("Run stopped early: {}", e);
    }
}

async fn evtol_directory(config: &Config, fetcher: &HttpFetcher) -> Result<Directory, CrawlerError> {
    let doc = fetcher.fetch(&config.evtol_directory_url).await?;
    let directory = evtol::extract_directory(&doc);
    info!("Found {} aircraft in the directory", directory.len());
    Ok(directory)
}

async fn backfill<C: Crawler>(
    harvester: &mut Harvester<C, HttpFetcher>,
    table_path: &Path,
    link: Option<String>,
    fields: &[String],
) -> Result<(), CrawlerError>
where
    C::Record: serde::Serialize + serde::de::DeserializeOwned,
{
    let mut table: Table<C::Record> = load_table(table_path)?;
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();

    let result = match link {
        Some(link) => harvester.backfill(&mut table, &link, &fields).await,
        None => harvester
            .backfill_missing(&mut table, &fields)
            .await
            .map(|report| log_report(&report)),
    };
    save_json(table_path, &table)?;
    result
}

fn check<R: Record>(table: &Table<R>, directory: Option<&Directory>) {
    if let Some(directory) = directory {
        println!("{}", check_updates(directory.len(), table.count()));
    }
    let frame = Frame::from_table(table);
    for (column, n) in frame.missing_counts() {
        println!("{:<24} {}", column, n);
    }
    let most = frame.most_missing();
    if !most.is_empty() {
        println!("Most missing: {:?}", most);
    }
}

fn prune(mut frame: Frame, output: &Path, threshold: f64) -> Result<(), CrawlerError> {
    hygiene::add_derived_columns(&mut frame)?;
    let dropped = hygiene::drop_null_columns(&mut frame, threshold)?;
    println!("These are the dropped columns: {:?}", dropped);
    save_json(output, &frame)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let fetcher = HttpFetcher::new(config.user_agent.as_deref())?;

    match cli.command {
        Command::EvtolDirectory { output } => {
            let directory = evtol_directory(&config, &fetcher).await?;
            save_json(&output, &directory)?;
        }
        Command::EvtolUpdate {
            table: table_path,
            directory,
            start,
            stop,
        } => {
            let directory: Directory = match directory {
                Some(path) => load_json(path)?,
                None => evtol_directory(&config, &fetcher).await?,
            };
            let mut table: Table<AircraftRecord> = load_table(&table_path)?;
            println!("{}", check_updates(directory.len(), table.count()));

            let mut harvester =
                Harvester::new(config.evtol_crawler(), fetcher, config.delay()?);
            let report = harvester
                .merge(&mut table, &directory, range(start, stop))
                .await;
            save_json(&table_path, &table)?;
            log_report(&report);
        }
        Command::TransportupUpdate {
            table: table_path,
            directory,
            start,
            stop,
            fill_stage,
        } => {
            let directory = Directory::from_json(&std::fs::read_to_string(directory)?)?;
            let mut table: Table<TransportUpRecord> = load_table(&table_path)?;
            println!("{}", check_updates(directory.len(), table.count()));

            let mut harvester =
                Harvester::new(config.transportup_crawler(), fetcher, config.delay()?);
            let report = harvester
                .merge(&mut table, &directory, range(start, stop))
                .await;
            if fill_stage {
                hygiene::fill_missing_dev_stage(&mut table, &config.null_stage_policy);
            }
            save_json(&table_path, &table)?;
            log_report(&report);
        }
        Command::Backfill {
            site,
            table,
            link,
            fields,
        } => match site {
            Site::Evtol => {
                let mut h = Harvester::new(config.evtol_crawler(), fetcher, config.delay()?);
                backfill(&mut h, &table, link, &fields).await?;
            }
            Site::Transportup => {
                let delay = config.delay()?;
                let mut h = Harvester::new(config.transportup_crawler(), fetcher, delay);
                backfill(&mut h, &table, link, &fields).await?;
            }
        },
        Command::Check {
            site,
            table,
            directory,
        } => {
            let directory: Option<Directory> = match directory {
                Some(path) => Some(load_json(path)?),
                None => None,
            };
            match site {
                Site::Evtol => {
                    check::<AircraftRecord>(&load_table(&table)?, directory.as_ref())
                }
                Site::Transportup => {
                    check::<TransportUpRecord>(&load_table(&table)?, directory.as_ref())
                }
            }
        }
        Command::Prune {
            site,
            table,
            output,
            threshold,
        } => {
            let frame = match site {
                Site::Evtol => Frame::from_table(&load_table::<AircraftRecord, _>(&table)?),
                Site::Transportup => {
                    Frame::from_table(&load_table::<TransportUpRecord, _>(&table)?)
                }
            };
            prune(frame, &output, threshold)?;
        }
    }

    Ok(())
}
