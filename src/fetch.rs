use crate::dom::Document;
use crate::error::FetchError;
use tracing::debug;

/// Turns a URL into a parsed document.
#[async_trait::async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: Option<&str>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua.to_string());
        }
        let client = builder.build().map_err(|e| FetchError::Request {
            url: String::new(),
            source: e,
        })?;
        Ok(Self { client })
    }
}

fn request_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_connect() {
        FetchError::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: e,
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        debug!("Visit {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| request_error(url, e))?;
        Ok(Document::parse(&html))
    }
}
