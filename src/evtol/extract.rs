//! Field rules for evtol.news detail pages.
//!
//! Core data (model, OEM, website, address) sits in one of the first
//! paragraphs, marked by a `<strong>` model name. The paragraph right after
//! it is the "about" text. Specifications and resources are `<ul>` lists
//! following labelled paragraphs.

use super::Status;
use crate::dom::{Document, NodeRef};
use crate::error::ExtractError;
use crate::extract::{
    bold_label, clean_text, list_links, non_empty, Fallback, LabelLocator, OrNa,
};

/// How many leading paragraphs are searched for core data.
pub const CORE_DATA_WINDOW: usize = 2;

pub const RESOURCES_LABEL: &str = "Resources:";
pub const SPECIFICATIONS_LABEL: &str = "Specifications:";

/// The paragraph holding model, OEM, website and address.
#[derive(Debug, Clone, Copy)]
pub struct CoreData<'a> {
    pub position: usize,
    pub node: NodeRef<'a>,
}

pub fn try_name(doc: &Document) -> Result<String, ExtractError> {
    let h1 = doc.find("h1").ok_or(ExtractError::MissingElement("h1"))?;
    non_empty(h1.text().trim().to_string(), "name")
}

pub fn name(doc: &Document) -> String {
    try_name(doc).or_na("name")
}

pub fn status(doc: &Document) -> Status {
    match try_name(doc) {
        Ok(name) if name.contains("defunct") => Status::Defunct,
        Ok(_) => Status::Active,
        Err(e) => {
            tracing::debug!(field = "status", error = %e, "falling back to sentinel");
            Status::Unknown
        }
    }
}

pub fn try_core_data(doc: &Document, window: usize) -> Result<CoreData<'_>, ExtractError> {
    doc.find_all("p")
        .take(window)
        .enumerate()
        .find(|(_, p)| bold_label(p).is_some())
        .map(|(position, node)| CoreData { position, node })
        .ok_or(ExtractError::NoCoreData(window))
}

/// `None` plays the part of the "error" sentinel: every dependent rule
/// falls back when core data is absent.
pub fn core_data(doc: &Document, window: usize) -> Option<CoreData<'_>> {
    try_core_data(doc, window)
        .map(Some)
        .or_fallback("core_data", None)
}

fn require<'c, 'a>(core: Option<&'c CoreData<'a>>) -> Result<&'c CoreData<'a>, ExtractError> {
    core.ok_or(ExtractError::MissingElement("core data paragraph"))
}

pub fn model(core: Option<&CoreData<'_>>) -> String {
    require(core)
        .and_then(|c| bold_label(&c.node).ok_or(ExtractError::MissingElement("strong")))
        .and_then(|strong| non_empty(strong.text().trim().to_string(), "model"))
        .or_na("model")
}

fn try_oem(core: Option<&CoreData<'_>>) -> Result<String, ExtractError> {
    let core = require(core)?;
    let label = core
        .node
        .child_elements()
        .find(|c| c.is("strong"))
        .ok_or(ExtractError::MissingElement("strong"))?;
    let mut value = label
        .next_sibling()
        .ok_or(ExtractError::MissingSibling("model"))?;
    if value.is("br") {
        value = value
            .next_sibling()
            .ok_or(ExtractError::MissingSibling("model"))?;
    }
    let oem = value
        .text()
        .trim()
        .replace('\u{a0}', "")
        .replace("\r\n", "");
    non_empty(oem, "oem")
}

pub fn oem(core: Option<&CoreData<'_>>) -> String {
    try_oem(core).or_na("oem")
}

pub fn aircraft_website(core: Option<&CoreData<'_>>) -> String {
    require(core)
        .and_then(|c| c.node.find("a").ok_or(ExtractError::MissingElement("a")))
        .and_then(|a| {
            a.attr("href")
                .map(|href| href.trim().to_string())
                .ok_or(ExtractError::MissingAttr {
                    tag: "a",
                    attr: "href",
                })
        })
        .and_then(|href| non_empty(href, "aircraft_website"))
        .or_na("aircraft_website")
}

/// Roughly nine in ten pages put the address in a bare text fragment with a
/// comma or "USA" in it.
pub fn address(core: Option<&CoreData<'_>>) -> String {
    require(core)
        .and_then(|c| {
            c.node
                .children()
                .filter_map(|child| child.as_text())
                .find(|t| t.contains(',') || t.contains("USA"))
                .map(|t| t.trim().to_string())
                .ok_or(ExtractError::NoMatch("an address"))
        })
        .and_then(|address| non_empty(address, "address"))
        .or_na("address")
}

pub fn about(core: Option<&CoreData<'_>>, doc: &Document) -> String {
    require(core)
        .and_then(|c| {
            let index = c.position + 1;
            doc.find_all("p")
                .nth(index)
                .map(|p| p.text().trim().to_string())
                .ok_or(ExtractError::MissingParagraph(index))
        })
        .and_then(|about| non_empty(about, "about"))
        .or_na("about")
}

pub fn resources(doc: &Document) -> Vec<String> {
    LabelLocator::new(RESOURCES_LABEL)
        .value(doc, "ul")
        .map(|ul| list_links(&ul))
        .or_fallback("resources", vec![])
}

pub fn specs(doc: &Document) -> Vec<String> {
    LabelLocator::new(SPECIFICATIONS_LABEL)
        .value(doc, "ul")
        .map(|ul| {
            ul.find_all("li")
                .map(|li| clean_text(&li.text()))
                .filter(|s| !s.is_empty())
                .collect()
        })
        .or_fallback("specs", vec![])
}
