use crate::evtol::{self, EvtolCrawler};
use crate::harvest::Delay;
use crate::transportup::{DevStage, TransportUpCrawler};
use crate::CrawlerError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Which rows get a default development stage when the page gave none.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NullStagePolicy {
    pub category: String,
    pub stage: DevStage,
}

impl Default for NullStagePolicy {
    fn default() -> Self {
        Self {
            category: "market".to_string(),
            stage: DevStage::PrototypeBuild,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub delay_min_secs: f64,
    pub delay_max_secs: f64,
    pub core_data_window: usize,
    pub user_agent: Option<String>,
    pub self_domain: String,
    pub null_stage_policy: NullStagePolicy,
    pub evtol_directory_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay_min_secs: 5.0,
            delay_max_secs: 10.0,
            core_data_window: evtol::extract::CORE_DATA_WINDOW,
            user_agent: None,
            self_domain: "transportup".to_string(),
            null_stage_policy: NullStagePolicy::default(),
            evtol_directory_url: evtol::DIRECTORY_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrawlerError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn delay(&self) -> Result<Delay, CrawlerError> {
        let secs =
            |s: f64| Duration::try_from_secs_f64(s).map_err(|_| CrawlerError::InvalidDelay(s));
        Ok(Delay::new(secs(self.delay_min_secs)?, secs(self.delay_max_secs)?))
    }

    pub fn evtol_crawler(&self) -> EvtolCrawler {
        EvtolCrawler {
            core_data_window: self.core_data_window,
        }
    }

    pub fn transportup_crawler(&self) -> TransportUpCrawler {
        TransportUpCrawler {
            self_domain: self.self_domain.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_keys_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"delay_min_secs": 1.5}"#).unwrap();
        assert_eq!(config.delay_min_secs, 1.5);
        assert_eq!(config.delay_max_secs, 10.0);
        assert_eq!(config.core_data_window, 2);
        assert_eq!(config.self_domain, "transportup");
        assert_eq!(config.null_stage_policy, NullStagePolicy::default());
    }

    #[test]
    fn stage_policy_is_overridable() {
        let config: Config = serde_json::from_str(
            r#"{"null_stage_policy": {"category": "cargo", "stage": "flight testing"}}"#,
        )
        .unwrap();
        assert_eq!(config.null_stage_policy.category, "cargo");
        assert_eq!(config.null_stage_policy.stage, DevStage::FlightTesting);
    }

    #[test]
    fn crawlers_follow_config() {
        let config = Config {
            core_data_window: 4,
            self_domain: "example".to_string(),
            ..Config::default()
        };
        assert_eq!(config.evtol_crawler().core_data_window, 4);
        assert_eq!(config.transportup_crawler().self_domain, "example");
    }

    #[test]
    fn delay_bounds_are_validated() {
        let config: Config = serde_json::from_str(r#"{"delay_max_secs": 1e20}"#).unwrap();
        assert!(matches!(
            config.delay(),
            Err(CrawlerError::InvalidDelay(s)) if s == 1e20
        ));

        let config: Config = serde_json::from_str(r#"{"delay_min_secs": -1.0}"#).unwrap();
        assert!(config.delay().is_err());

        let config: Config =
            serde_json::from_str(r#"{"delay_min_secs": 2.5, "delay_max_secs": 1}"#).unwrap();
        assert_eq!(
            config.delay().unwrap(),
            Delay::new(Duration::from_millis(1000), Duration::from_millis(2500))
        );
    }

    #[test]
    fn unknown_stage_is_rejected() {
        assert!(serde_json::from_str::<Config>(
            r#"{"null_stage_policy": {"stage": "grounded"}}"#
        )
        .is_err());
    }
}
