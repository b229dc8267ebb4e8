use crate::dom::{Document, NodeRef};
use crate::error::ExtractError;
use tracing::debug;

pub const NA: &str = "N/A";

pub(crate) trait Fallback<T> {
    fn or_fallback(self, field: &'static str, fallback: T) -> T;
}

impl<T> Fallback<T> for Result<T, ExtractError> {
    fn or_fallback(self, field: &'static str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                debug!(field, error = %e, "falling back to sentinel");
                fallback
            }
        }
    }
}

pub(crate) fn non_empty(s: String, field: &'static str) -> Result<String, ExtractError> {
    if s.is_empty() {
        Err(ExtractError::Empty(field))
    } else {
        Ok(s)
    }
}

pub(crate) trait OrNa {
    fn or_na(self, field: &'static str) -> String;
}

impl OrNa for Result<String, ExtractError> {
    fn or_na(self, field: &'static str) -> String {
        self.or_fallback(field, NA.to_string())
    }
}

pub fn bold_label<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.find("strong")
}

#[derive(Debug, Clone)]
pub struct LabelLocator<'l> {
    label: &'l str,
    max_walk: Option<usize>,
}

impl<'l> LabelLocator<'l> {
    pub fn new(label: &'l str) -> Self {
        Self {
            label,
            max_walk: None,
        }
    }

    /// Element siblings only.
    pub fn within(mut self, n: usize) -> Self {
        self.max_walk = Some(n);
        self
    }

    pub fn labelled<'a>(&self, doc: &'a Document) -> Result<NodeRef<'a>, ExtractError> {
        doc.find_all("p")
            .find(|p| p.children().any(|c| c.text().contains(self.label)))
            .ok_or_else(|| ExtractError::MissingLabel(self.label.to_string()))
    }

    pub fn value<'a>(
        &self,
        doc: &'a Document,
        tag: &'static str,
    ) -> Result<NodeRef<'a>, ExtractError> {
        let labelled = self.labelled(doc)?;
        labelled
            .following_siblings()
            .filter(|s| s.name().is_some())
            .take(self.max_walk.unwrap_or(usize::MAX))
            .find(|s| s.is(tag))
            .ok_or_else(|| ExtractError::MissingList {
                label: self.label.to_string(),
                tag,
            })
    }
}

/// Strips the non-breaking spaces and CRLFs hand-written pages are full of.
pub fn clean_text(s: &str) -> String {
    s.trim().replace('\u{a0}', " ").replace("\r\n", " ")
}

/// Anchors directly under a `<li>`.
pub fn list_links(list: &NodeRef<'_>) -> Vec<String> {
    list.find_all("li")
        .flat_map(|li| li.child_elements().filter(|c| c.is("a")))
        .filter_map(|a| a.attr("href"))
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body>
        <p><strong>Resources:</strong></p>
        <div>spacer</div>
        <ul><li><a href="https://a.example">a</a></li><li>plain</li><li><a href="https://b.example">b</a></li></ul>
        </body></html>"#;

    #[test]
    fn locator_walks_to_list() {
        let doc = Document::parse(PAGE);
        let ul = LabelLocator::new("Resources:").value(&doc, "ul").unwrap();
        assert_eq!(
            list_links(&ul),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn locator_respects_walk_distance() {
        let doc = Document::parse(PAGE);
        let err = LabelLocator::new("Resources:")
            .within(1)
            .value(&doc, "ul")
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingList {
                label: "Resources:".to_string(),
                tag: "ul"
            }
        );
    }

    #[test]
    fn missing_label_is_an_error_not_a_panic() {
        let doc = Document::parse(PAGE);
        assert!(matches!(
            LabelLocator::new("Specifications:").value(&doc, "ul"),
            Err(ExtractError::MissingLabel(_))
        ));
    }

    #[test]
    fn fallback_returns_sentinel() {
        let failed: Result<String, ExtractError> = Err(ExtractError::Empty("name"));
        assert_eq!(failed.or_na("name"), NA);
        let failed: Result<Vec<String>, ExtractError> = Err(ExtractError::Empty("specs"));
        assert!(failed.or_fallback("specs", vec![]).is_empty());
    }

    #[test]
    fn clean_text_strips_artifacts() {
        assert_eq!(clean_text(" 4\u{a0}passengers\r\nmax "), "4 passengers max");
    }
}
