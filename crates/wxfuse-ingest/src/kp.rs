//! Planetary K index adapter (NOAA SWPC)
//!
//! The feed is a JSON array ordered oldest first. Older revisions send rows
//! as arrays after a header row, newer ones as objects; the value itself may
//! be a string or a number.

use serde_json::Value;

use crate::{HttpFetcher, IngestError, Query, SourceOutcome};

/// Latest Kp value from the feed, `None` when the last row has none
pub fn latest_kp(rows: &[Value]) -> Option<f64> {
    let value = match rows.last()? {
        Value::Array(columns) => columns.get(1),
        Value::Object(fields) => fields.get("Kp").or_else(|| fields.get("kp")),
        _ => None,
    }?;

    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub struct KpSource {
    http: HttpFetcher,
    url: String,
}

impl KpSource {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn fetch(&self, _query: &Query) -> SourceOutcome<f64> {
        let body: Value = match self.http.get_json(&self.url, &[]).await {
            Ok(body) => body,
            Err(e) => return SourceOutcome::Failed(e),
        };

        match body.as_array() {
            Some(rows) => SourceOutcome::from_option(latest_kp(rows)),
            None => SourceOutcome::Failed(IngestError::Malformed("expected a JSON array".into())),
        }
    }
}
