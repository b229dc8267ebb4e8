//! Field rules for transportup.com aircraft pages.

use super::DevStage;
use crate::dom::{Document, NodeRef};
use crate::error::ExtractError;
use crate::extract::{bold_label, non_empty, Fallback, OrNa};
use lazy_regex::regex_is_match;
use std::collections::BTreeMap;

pub const SUMMARY_PARAGRAPH: usize = 2;

pub fn summary(doc: &Document) -> String {
    doc.find_all("p")
        .nth(SUMMARY_PARAGRAPH)
        .map(|p| p.text().trim().to_string())
        .ok_or(ExtractError::MissingParagraph(SUMMARY_PARAGRAPH))
        .and_then(|summary| non_empty(summary, "summary"))
        .or_na("summary")
}

fn is_stage_icon(node: &NodeRef<'_>) -> bool {
    node.attrs().any(|(k, _)| k.starts_with("data-x-icon"))
}

/// A lit stage icon declares a colour and no `0%` fill; unlit icons in the
/// same row carry `0%`.
fn is_lit(icon: &NodeRef<'_>) -> bool {
    let has_color = icon
        .attrs()
        .any(|(k, v)| k.contains("color") || v.contains("color"));
    let unfilled = icon
        .attrs()
        .any(|(_, v)| regex_is_match!(r"(?:^|[^\d.])0%", v));
    has_color && !unfilled
}

fn try_dev_stage(doc: &Document) -> Result<DevStage, ExtractError> {
    let position = doc
        .find_all("i")
        .filter(is_stage_icon)
        .position(|icon| is_lit(&icon))
        .ok_or(ExtractError::NoMatch("a lit stage icon"))?;
    DevStage::from_position(position).ok_or(ExtractError::NoMatch("one of five stages"))
}

/// Best effort: reads the first lit icon of the five-step stage indicator.
pub fn dev_stage(doc: &Document) -> Option<DevStage> {
    try_dev_stage(doc).map(Some).or_fallback("dev_stage", None)
}

/// `label -> raw node after the label`: decoded text for text nodes, markup
/// for elements. Labels with nothing after them are left out.
pub fn details(doc: &Document) -> BTreeMap<String, String> {
    let mut details = BTreeMap::new();
    for p in doc.find_all("p") {
        let Some(strong) = bold_label(&p) else {
            continue;
        };
        let key = strong.text().trim().replace(':', "");
        match strong.next_sibling() {
            Some(value) => {
                let raw = match value.as_text() {
                    Some(text) => text.to_string(),
                    None => value.outer_html(),
                };
                details.insert(key, raw);
            }
            None => {
                tracing::debug!(field = "details", label = %key, "label has no value");
            }
        }
    }
    details
}

/// Links from the page's last `<ul>`, minus those back to `self_domain`.
pub fn references(doc: &Document, self_domain: &str) -> Vec<String> {
    doc.find_all("ul")
        .last()
        .ok_or(ExtractError::MissingElement("ul"))
        .map(|ul| {
            ul.find_all("li")
                .filter_map(|li| li.find("a"))
                .filter_map(|a| a.attr("href"))
                .filter(|href| !href.contains(self_domain))
                .map(ToString::to_string)
                .collect()
        })
        .or_fallback("references", vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::NA;
    use pretty_assertions::assert_eq;

    fn stage_row(lit: Option<usize>) -> Document {
        let mut doc = Document::new("html");
        let body = doc.append_element(doc.root_id(), "body", &[]);
        for i in 0..5 {
            let style = if Some(i) == lit {
                "color: #2a9d8f; background-size: 100%;"
            } else {
                "color: #ccc; background-size: 0%;"
            };
            doc.append_element(body, "i", &[("data-x-icon-s", ""), ("style", style)]);
        }
        doc
    }

    #[test]
    fn stage_from_first_lit_icon() {
        assert_eq!(dev_stage(&stage_row(Some(2))), Some(DevStage::FlightTesting));
        assert_eq!(dev_stage(&stage_row(Some(0))), Some(DevStage::PreliminaryDesign));
        assert_eq!(
            dev_stage(&stage_row(Some(4))),
            Some(DevStage::CommerciallyOperating)
        );
    }

    #[test]
    fn no_lit_icon_is_null() {
        assert_eq!(dev_stage(&stage_row(None)), None);
    }

    #[test]
    fn icons_without_marker_are_ignored() {
        let doc = Document::parse(
            r#"<i class="fa" style="color: red"></i>
               <i data-x-icon-s="" style="color: #ccc; width: 0%"></i>
               <i data-x-icon-s="" style="color: #2a9d8f"></i>"#,
        );
        assert_eq!(dev_stage(&doc), Some(DevStage::PrototypeBuild));
    }

    #[test]
    fn lit_icon_needs_color() {
        let doc = Document::parse(r#"<i data-x-icon-s="" style="width: 50%"></i>"#);
        assert_eq!(dev_stage(&doc), None);
    }

    #[test]
    fn summary_is_hardened() {
        let doc = Document::parse("<p>one</p><p>two</p>");
        assert_eq!(summary(&doc), NA);
        let doc = Document::parse("<p>one</p><p>two</p><p> \u{a0} </p>");
        assert_eq!(summary(&doc), NA);
    }

    #[test]
    fn details_keep_raw_sibling() {
        let doc = Document::parse(
            "<p><strong>Top Speed:</strong><em>200</em> km/h</p><p><strong>Wingspan:</strong></p>",
        );
        let d = details(&doc);
        assert_eq!(d.len(), 1);
        assert_eq!(d["Top Speed"], "<em>200</em>");
    }

    #[test]
    fn text_details_are_not_reescaped() {
        let doc = Document::parse(
            "<p><strong>Powerplant:</strong> Hybrid &amp; electric&nbsp;</p>\
             <p><strong>Seats:</strong><b>2 &amp; 1</b></p>",
        );
        let d = details(&doc);
        assert_eq!(d["Powerplant"], " Hybrid & electric\u{a0}");
        assert_eq!(d["Seats"], "<b>2 &amp; 1</b>");
    }

    #[test]
    fn references_without_lists_are_empty() {
        let doc = Document::parse("<p>nothing</p>");
        assert!(references(&doc, "transportup").is_empty());
    }
}
