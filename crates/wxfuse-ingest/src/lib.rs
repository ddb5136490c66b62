//! Source adapters for the external weather and space-weather feeds
//!
//! Each adapter turns one provider's JSON into the shared schema from
//! `wxfuse-core`. Adapters never fail the caller: transport errors, bad
//! payloads and missing credentials all come back as a [`SourceOutcome`].

pub mod aurora;
pub mod geocode;
pub mod http;
pub mod kp;
pub mod smhi;
pub mod weatherapi;

pub use aurora::AuroraSource;
pub use geocode::PlaceResolver;
pub use http::HttpFetcher;
pub use kp::KpSource;
pub use smhi::SmhiSource;
pub use weatherapi::WeatherApiSource;

use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use wxfuse_core::{SourceReport, Timestamp};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Missing credential")]
    MissingCredential,

    #[error("Timeout waiting for data")]
    Timeout,
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Result of asking one source for data
#[derive(Debug)]
pub enum SourceOutcome<T> {
    /// The source answered with usable data
    Data(T),
    /// The source answered, or was skipped, without anything usable
    Empty,
    /// The source could not be reached or its answer could not be read
    Failed(IngestError),
}

impl<T> SourceOutcome<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Data(v),
            None => Self::Empty,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn data(self) -> Option<T> {
        match self {
            Self::Data(v) => Some(v),
            _ => None,
        }
    }

    /// Log anything other than data and hand back what the source produced
    pub fn into_logged(self, source: &str) -> Option<T> {
        match self {
            Self::Data(v) => Some(v),
            Self::Empty => {
                tracing::info!(source, "source returned no data");
                None
            }
            Self::Failed(e) => {
                tracing::warn!(source, error = %e, "source failed, continuing without it");
                None
            }
        }
    }
}

impl<T> From<IngestResult<Option<T>>> for SourceOutcome<T> {
    fn from(result: IngestResult<Option<T>>) -> Self {
        match result {
            Ok(value) => Self::from_option(value),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Point and instant a fetch is made for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub latitude: f64,
    pub longitude: f64,
    pub now: DateTime<Utc>,
}

impl Query {
    pub fn new(latitude: f64, longitude: f64, now: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            now,
        }
    }

    /// Start of the current hour; only steps after it are kept
    pub fn cutoff(&self) -> Timestamp {
        let now = self.now.timestamp();
        now - now.rem_euclid(3600)
    }

    pub fn keeps(&self, time: Timestamp) -> bool {
        time > self.cutoff()
    }
}

/// Trait for point-forecast providers
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    /// Source name used in logs
    fn name(&self) -> &str;

    /// Fetch and normalize the provider's forecast for `query`
    async fn fetch(&self, query: &Query) -> SourceOutcome<SourceReport>;
}

/// Bound a fetch by `deadline`. An expired fetch is dropped, which cancels
/// its in-flight request.
pub async fn with_deadline<T, F>(deadline: Duration, fetch: F) -> SourceOutcome<T>
where
    F: Future<Output = SourceOutcome<T>>,
{
    match tokio::time::timeout(deadline, fetch).await {
        Ok(outcome) => outcome,
        Err(_) => SourceOutcome::Failed(IngestError::Timeout),
    }
}
