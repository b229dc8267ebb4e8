use crate::directory::{Directory, DirectoryEntry};
use crate::dom::Document;
use tracing::{debug, warn};

pub const DIRECTORY_URL: &str = "https://evtol.news/aircraft";

/// Bold labels inside paragraphs, minus the leading "Welcome" banner.
pub fn category_labels(doc: &Document) -> Vec<String> {
    doc.find_all("p")
        .flat_map(|p| p.find_all("strong"))
        .map(|strong| strong.text().trim().to_string())
        .skip(1)
        .collect()
}

/// Each `<ol>` lists the aircraft of the category label at the same index.
pub fn extract_directory(doc: &Document) -> Directory {
    let categories = category_labels(doc);
    debug!("Directory categories: {:?}", categories);

    let mut entries = vec![];
    for (i, ol) in doc.find_all("ol").enumerate() {
        let Some(category) = categories.get(i) else {
            warn!("Ordered list {} has no category label, skipping", i);
            continue;
        };
        for li in ol.find_all("li") {
            let link = li
                .find("a")
                .and_then(|a| a.attr("href"))
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("error at index: {}", i));
            entries.push(DirectoryEntry::new(link, category.as_str()));
        }
    }
    Directory::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_parsing_directory() {
        let html = fs::read_to_string("tests/htmls/evtol_directory.html").expect("Invalid file url");
        let doc = Document::parse(&html);

        assert_eq!(
            category_labels(&doc),
            vec![
                "Vectored Thrust".to_string(),
                "Lift + Cruise".to_string(),
                "Wingless (Multicopter)".to_string(),
            ]
        );

        let directory = extract_directory(&doc);
        let pairs: Vec<(&str, &str)> = directory
            .iter()
            .map(|e| (e.link.as_str(), e.category.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("https://evtol.news/a3-by-airbus/", "Vectored Thrust"),
                ("https://evtol.news/joby-aviation-s4/", "Vectored Thrust"),
                ("https://evtol.news/wisk-cora/", "Lift + Cruise"),
                ("error at index: 1", "Lift + Cruise"),
                ("https://evtol.news/volocopter-2x/", "Wingless (Multicopter)"),
            ]
        );
    }

    #[test]
    fn unlabelled_list_is_skipped() {
        let doc = Document::parse(
            r#"<p><strong>Welcome</strong></p><p><strong>Only</strong></p>
            <ol><li><a href="a">a</a></li></ol><ol><li><a href="b">b</a></li></ol>"#,
        );
        let directory = extract_directory(&doc);
        assert_eq!(directory.entries(), &[DirectoryEntry::new("a", "Only")]);
    }
}
