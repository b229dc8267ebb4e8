#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("Fetch error")]
    Fetch(#[from] FetchError),
    #[error("Link {0} is not in the table")]
    UnknownLink(String),
    #[error("Unknown field {field:?}, expected one of {expected:?}")]
    UnknownField {
        field: String,
        expected: &'static [&'static str],
    },
    #[error("Link {0} is already in the table")]
    DuplicateLink(String),
    #[error("Null threshold must be within 0..=1, got {0}")]
    InvalidThreshold(f64),
    #[error("Delay must be a non-negative number of seconds, got {0}")]
    InvalidDelay(f64),
    #[error("Json error")]
    Json(#[from] serde_json::Error),
    #[error("Io error")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Expected a 2xx response from {url} but got {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },
}

impl FetchError {
    /// Whether the whole run should stop rather than skip this page.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Unreachable { .. })
    }
}

/// Why a single field rule fell back to its sentinel.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no <{0}> element")]
    MissingElement(&'static str),
    #[error("no paragraph labelled {0:?}")]
    MissingLabel(String),
    #[error("no <{tag}> after the {label:?} label")]
    MissingList { label: String, tag: &'static str },
    #[error("<{tag}> has no {attr} attribute")]
    MissingAttr {
        tag: &'static str,
        attr: &'static str,
    },
    #[error("core data not found in the first {0} paragraphs")]
    NoCoreData(usize),
    #[error("nothing follows the {0} label")]
    MissingSibling(&'static str),
    #[error("no text fragment looks like {0}")]
    NoMatch(&'static str),
    #[error("paragraph {0} does not exist")]
    MissingParagraph(usize),
    #[error("empty {0}")]
    Empty(&'static str),
}
