use std::time::Duration;

use anyhow::{Context, Result};

use model::Fetch;

/// Fetches url tasks over http(s) with a blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(format!("maestro/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("while creating http client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}
