mod crawler;
pub mod extract;

pub use crawler::TransportUpCrawler;

use crate::data::{Record, Value};
use crate::extract::NA;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Five-step development indicator, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevStage {
    #[serde(rename = "preliminary design")]
    PreliminaryDesign,
    #[serde(rename = "prototype build")]
    PrototypeBuild,
    #[serde(rename = "flight testing")]
    FlightTesting,
    #[serde(rename = "certification")]
    Certification,
    #[serde(rename = "commercially operating")]
    CommerciallyOperating,
}

impl DevStage {
    pub const ALL: [DevStage; 5] = [
        DevStage::PreliminaryDesign,
        DevStage::PrototypeBuild,
        DevStage::FlightTesting,
        DevStage::Certification,
        DevStage::CommerciallyOperating,
    ];

    pub fn from_position(position: usize) -> Option<DevStage> {
        Self::ALL.get(position).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DevStage::PreliminaryDesign => "preliminary design",
            DevStage::PrototypeBuild => "prototype build",
            DevStage::FlightTesting => "flight testing",
            DevStage::Certification => "certification",
            DevStage::CommerciallyOperating => "commercially operating",
        }
    }
}

impl fmt::Display for DevStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DevStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown development stage {:?}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportUpRecord {
    pub link: String,
    pub category: String,
    pub ac_name: String,
    pub summary: String,
    pub dev_stage: Option<DevStage>,
    pub references: Vec<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl fmt::Display for TransportUpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Link            : {}", self.link)?;
        writeln!(f, "Category        : {}", self.category)?;
        writeln!(f, "Name            : {}", self.ac_name)?;
        writeln!(f, "Summary         : {}", self.summary)?;
        if let Some(d) = self.dev_stage.as_ref() {
            writeln!(f, "Dev Stage       : {}", d)?;
        } else {
            writeln!(f, "Dev Stage       : None")?;
        };
        writeln!(f, "Details         : ")?;
        for (k, v) in &self.details {
            writeln!(f, "> {}: {}", k, v.trim())?;
        }
        writeln!(f, "References      : ")?;
        for r in &self.references {
            writeln!(f, "> {}", r)?;
        }
        Ok(())
    }
}

impl Record for TransportUpRecord {
    fn link(&self) -> &str {
        &self.link
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn is_missing(&self, field: &str) -> bool {
        match field {
            "ac_name" => self.ac_name == NA,
            "summary" => self.summary == NA,
            "dev_stage" => self.dev_stage.is_none(),
            "references" => self.references.is_empty(),
            "details" => self.details.is_empty(),
            _ => false,
        }
    }

    fn cells(&self) -> Vec<(String, Value)> {
        let mut cells = vec![
            ("link".to_string(), Value::text(&self.link)),
            ("category".to_string(), Value::text(&self.category)),
            ("ac_name".to_string(), Value::text(&self.ac_name)),
            ("summary".to_string(), Value::text(&self.summary)),
            (
                "dev_stage".to_string(),
                Value::from(self.dev_stage.map(|d| d.as_str())),
            ),
            ("references".to_string(), Value::list(&self.references)),
        ];
        cells.extend(
            self.details
                .iter()
                .map(|(k, v)| (k.clone(), Value::text(v.trim()))),
        );
        cells
    }
}
