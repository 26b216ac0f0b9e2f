use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::data::record::Record;

/// Blocking client for the members endpoint
///
/// One GET, no query parameters or auth headers; the whole body is read
/// into memory and parsed as a JSON array of records.
#[derive(Clone)]
pub struct MembersClient {
    url: String,
    client: reqwest::blocking::Client,
}

impl MembersClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Client that gives up after `timeout`
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fetch_members(&self) -> Result<Vec<Record>> {
        info!(target: "fetch", "GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!("API Error ({}): {}", status, error_text));
        }

        let body = response.text().context("reading response body")?;
        debug!(target: "fetch", "received {} bytes", body.len());
        parse_members(&body)
    }
}

/// Parse a JSON array of member records
///
/// Each element must be an object with an integer (or numeric string) `id`;
/// the first bad element fails the whole payload with its index.
pub fn parse_members(body: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(body).context("response is not valid JSON")?;
    let Value::Array(items) = value else {
        return Err(anyhow!("expected a JSON array of members"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<Record>(item)
                .with_context(|| format!("member at index {} is not a valid record", idx))
        })
        .collect()
}
