//! Reverse geocoding: convert coordinates to a "City, Country" place name.
//! Uses Nominatim (OpenStreetMap), which requires a descriptive User-Agent.

use serde::Deserialize;
use tracing::debug;

use crate::{HttpFetcher, Query, SourceOutcome};

#[derive(Debug, Clone, Deserialize)]
pub struct NominatimResponse {
    pub address: Option<NominatimAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub country: Option<String>,
}

/// City over town; the locality is left out when neither exists, and the
/// country alone is used when it is the only component.
pub fn format_place(address: &NominatimAddress) -> Option<String> {
    let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());

    let locality = non_empty(&address.city).or_else(|| non_empty(&address.town));
    let country = non_empty(&address.country);

    match (locality, country) {
        (Some(locality), Some(country)) => Some(format!("{}, {}", locality, country)),
        (Some(locality), None) => Some(locality),
        (None, country) => country,
    }
}

pub struct PlaceResolver {
    http: HttpFetcher,
    base_url: String,
}

impl PlaceResolver {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn resolve(&self, query: &Query) -> SourceOutcome<String> {
        let url = format!("{}/reverse", self.base_url.trim_end_matches('/'));
        let params = [
            ("format", "jsonv2".to_string()),
            ("lat", query.latitude.to_string()),
            ("lon", query.longitude.to_string()),
            ("zoom", "10".to_string()),
            ("addressdetails", "1".to_string()),
        ];

        let body: NominatimResponse = match self.http.get_json(&url, &params).await {
            Ok(body) => body,
            Err(e) => return SourceOutcome::Failed(e),
        };

        let place = body.address.as_ref().and_then(format_place);
        if let Some(name) = &place {
            debug!(place = %name, "reverse geocoded");
        }
        SourceOutcome::from_option(place)
    }
}
