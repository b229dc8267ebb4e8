use super::extract::{self, CORE_DATA_WINDOW};
use super::AircraftRecord;
use crate::{Crawler, DirectoryEntry, Document};

pub const FIELDS: &[&str] = &[
    "name",
    "status",
    "specs",
    "resources",
    "oem",
    "model",
    "aircraft_website",
    "address",
    "about",
];

#[derive(Debug, Clone)]
pub struct EvtolCrawler {
    pub core_data_window: usize,
}

impl Default for EvtolCrawler {
    fn default() -> Self {
        Self {
            core_data_window: CORE_DATA_WINDOW,
        }
    }
}

impl Crawler for EvtolCrawler {
    type Record = AircraftRecord;

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn assemble(&self, entry: &DirectoryEntry, doc: &Document) -> Self::Record {
        let core = extract::core_data(doc, self.core_data_window);
        let core = core.as_ref();

        AircraftRecord {
            link: entry.link.clone(),
            category: entry.category.clone(),
            name: extract::name(doc),
            status: extract::status(doc),
            specs: extract::specs(doc),
            resources: extract::resources(doc),
            oem: extract::oem(core),
            model: extract::model(core),
            aircraft_website: extract::aircraft_website(core),
            address: extract::address(core),
            about: extract::about(core, doc),
        }
    }

    fn refresh(&self, record: &mut Self::Record, fields: &[&str], doc: &Document) {
        let core = extract::core_data(doc, self.core_data_window);
        let core = core.as_ref();

        for field in fields {
            match *field {
                "name" => record.name = extract::name(doc),
                "status" => record.status = extract::status(doc),
                "specs" => record.specs = extract::specs(doc),
                "resources" => record.resources = extract::resources(doc),
                "oem" => record.oem = extract::oem(core),
                "model" => record.model = extract::model(core),
                "aircraft_website" => record.aircraft_website = extract::aircraft_website(core),
                "address" => record.address = extract::address(core),
                "about" => record.about = extract::about(core, doc),
                other => tracing::warn!("Ignoring unknown field {}", other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CrawlerError;
    use pretty_assertions::assert_eq;

    #[test]
    fn refresh_touches_only_named_fields() {
        let c = EvtolCrawler::default();
        let entry = DirectoryEntry::new("l", "c");
        let before = c.assemble(
            &entry,
            &Document::parse("<h1>Old</h1><p><strong>M</strong><br>Old Maker</p>"),
        );
        let page = Document::parse("<h1>New</h1><p><strong>M2</strong><br>New Maker</p>");

        let mut after = before.clone();
        c.refresh(&mut after, &["oem"], &page);
        assert_eq!(after.oem, "New Maker");
        assert_eq!(after.name, "Old");
        assert_eq!(after.model, "M");
    }

    #[test]
    fn window_is_configurable() {
        let page = Document::parse("<p>a</p><p>b</p><p><strong>Deep</strong></p>");
        let entry = DirectoryEntry::new("l", "c");
        assert_eq!(EvtolCrawler::default().assemble(&entry, &page).model, "N/A");
        let wide = EvtolCrawler { core_data_window: 3 };
        assert_eq!(wide.assemble(&entry, &page).model, "Deep");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let c = EvtolCrawler::default();
        assert!(c.check_fields(&["oem", "about"]).is_ok());
        assert!(matches!(
            c.check_fields(&["oem", "wingspan"]),
            Err(CrawlerError::UnknownField { field, .. }) if field == "wingspan"
        ));
    }
}
