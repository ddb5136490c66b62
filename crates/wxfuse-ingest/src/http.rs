//! Shared HTTP client for all feeds

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::{IngestError, IngestResult};

/// How much of an error body ends up in the error message
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> IngestResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.to_string())
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> IngestResult<T> {
        debug!(url, "GET");

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;

        if !status.is_success() {
            let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(IngestError::Status {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str(&body).map_err(|e| IngestError::Malformed(e.to_string()))
    }
}

fn classify(e: reqwest::Error) -> IngestError {
    if e.is_timeout() {
        IngestError::Timeout
    } else {
        IngestError::Transport(e)
    }
}
