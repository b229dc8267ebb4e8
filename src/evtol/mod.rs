mod crawler;
pub mod directory;
pub mod extract;

pub use crawler::EvtolCrawler;
pub use directory::{extract_directory, DIRECTORY_URL};

use crate::data::{Record, Value};
use crate::extract::NA;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "defunct")]
    Defunct,
    #[serde(rename = "N/A")]
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Defunct => write!(f, "defunct"),
            Status::Unknown => write!(f, "{}", NA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AircraftRecord {
    pub link: String,
    pub category: String,
    pub name: String,
    pub status: Status,
    pub specs: Vec<String>,
    pub resources: Vec<String>,
    pub oem: String,
    pub model: String,
    pub aircraft_website: String,
    pub address: String,
    pub about: String,
}

impl fmt::Display for AircraftRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Link            : {}", self.link)?;
        writeln!(f, "Category        : {}", self.category)?;
        writeln!(f, "Name            : {}", self.name)?;
        writeln!(f, "Status          : {}", self.status)?;
        writeln!(f, "Model           : {}", self.model)?;
        writeln!(f, "OEM             : {}", self.oem)?;
        writeln!(f, "Website         : {}", self.aircraft_website)?;
        writeln!(f, "Address         : {}", self.address)?;
        writeln!(f, "About           : {}", self.about)?;
        writeln!(f, "Specs           : ")?;
        for s in &self.specs {
            writeln!(f, "> {}", s)?;
        }
        writeln!(f, "Resources       : ")?;
        for r in &self.resources {
            writeln!(f, "> {}", r)?;
        }
        Ok(())
    }
}

impl Record for AircraftRecord {
    fn link(&self) -> &str {
        &self.link
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn is_missing(&self, field: &str) -> bool {
        match field {
            "name" => self.name == NA,
            "status" => self.status == Status::Unknown,
            "specs" => self.specs.is_empty(),
            "resources" => self.resources.is_empty(),
            "oem" => self.oem == NA,
            "model" => self.model == NA,
            "aircraft_website" => self.aircraft_website == NA,
            "address" => self.address == NA,
            "about" => self.about == NA,
            _ => false,
        }
    }

    fn cells(&self) -> Vec<(String, Value)> {
        let status = match self.status {
            Status::Unknown => Value::Missing,
            s => Value::text(s.to_string()),
        };
        vec![
            ("link".to_string(), Value::text(&self.link)),
            ("category".to_string(), Value::text(&self.category)),
            ("name".to_string(), Value::text(&self.name)),
            ("status".to_string(), status),
            ("specs".to_string(), Value::list(&self.specs)),
            ("resources".to_string(), Value::list(&self.resources)),
            ("oem".to_string(), Value::text(&self.oem)),
            ("model".to_string(), Value::text(&self.model)),
            ("aircraft_website".to_string(), Value::text(&self.aircraft_website)),
            ("address".to_string(), Value::text(&self.address)),
            ("about".to_string(), Value::text(&self.about)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::{Crawler, DirectoryEntry};
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_parsing_aircraft_page() {
        let s = EvtolCrawler::default();
        let html = fs::read_to_string("tests/htmls/evtol_aircraft.html").expect("Invalid file url");
        let doc = Document::parse(&html);
        let entry = DirectoryEntry::new("https://evtol.news/a3-by-airbus/", "Vectored Thrust");

        let record = s.assemble(&entry, &doc);
        let expected = AircraftRecord {
            link: "https://evtol.news/a3-by-airbus/".to_string(),
            category: "Vectored Thrust".to_string(),
            name: "Airbus A³ Vahana (defunct)".to_string(),
            status: Status::Defunct,
            specs: vec![
                "Aircraft type: eVTOL tilt-wing".to_string(),
                "Crew: 1 passenger".to_string(),
                "Cruise speed: 190 km/h".to_string(),
            ],
            resources: vec![
                "https://www.airbus.com/vahana-has-completed-its-journey".to_string(),
                "https://evtol.news/news/vahana-flies".to_string(),
            ],
            oem: "Airbus A³".to_string(),
            model: "Vahana Alpha Two".to_string(),
            aircraft_website: "https://www.airbus-sv.com/projects/1".to_string(),
            address: "San Jose, California, USA".to_string(),
            about: "The Vahana was a single-passenger tilt-wing eVTOL demonstrator developed by A³, the Silicon Valley outpost of Airbus. The program completed more than 100 full-scale test flights before it ended in 2019.".to_string(),
        };
        assert_eq!(record, expected);
    }

    #[test]
    fn page_without_labels_gives_sentinels() {
        let s = EvtolCrawler::default();
        let doc = Document::parse("<html><body><div>Page moved</div></body></html>");
        let entry = DirectoryEntry::new("https://evtol.news/gone/", "Lift + Cruise");

        let record = s.assemble(&entry, &doc);
        assert_eq!(record.category, "Lift + Cruise");
        assert_eq!(record.status, Status::Unknown);
        assert!(record.specs.is_empty() && record.resources.is_empty());
        for field in s.fields().iter().filter(|f| **f != "status") {
            assert!(record.is_missing(field), "{} should be missing", field);
        }
        assert_eq!(
            serde_json::to_value(&record).unwrap()["status"],
            serde_json::json!("N/A")
        );
    }

    #[test]
    fn blank_oem_counts_as_missing_everywhere() {
        let s = EvtolCrawler::default();
        let doc = Document::parse("<h1>Vahana</h1><p><strong>Vahana</strong> <br>Airbus</p>");
        let mut table = crate::Table::new();
        table.insert(s.assemble(&DirectoryEntry::new("l", "c"), &doc)).unwrap();

        let record = table.get("l").unwrap();
        assert_eq!(record.oem, NA);
        assert!(record.is_missing("oem"));
        assert!(crate::Frame::from_table(&table)
            .missing_counts()
            .contains(&("oem".to_string(), 1)));
    }

    #[test]
    fn cells_map_sentinels_to_missing() {
        let s = EvtolCrawler::default();
        let doc = Document::parse("<h1>Only a name</h1>");
        let record = s.assemble(&DirectoryEntry::new("l", "c"), &doc);
        let cells = record.cells();
        assert_eq!(cells[2], ("name".to_string(), Value::text("Only a name")));
        assert_eq!(cells[3], ("status".to_string(), Value::text("active")));
        assert!(cells[4..].iter().all(|(_, v)| v.is_missing()));
    }
}
