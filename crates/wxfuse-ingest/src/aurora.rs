//! Aurora probability adapter (NOAA SWPC OVATION)

use serde::Deserialize;

use crate::{HttpFetcher, Query, SourceOutcome};

/// Max distance on each axis for a grid point to count as nearby (degrees)
pub const TOLERANCE_DEGREES: f64 = 1.0;

#[derive(Debug, Clone, Deserialize)]
pub struct OvationResponse {
    /// `[longitude, latitude, probability]`, longitude in 0..360
    pub coordinates: Vec<Vec<f64>>,
}

/// Probability at the first grid point within tolerance of the query.
///
/// This is the first match in feed order, not the nearest one.
pub fn find_probability(coordinates: &[Vec<f64>], latitude: f64, longitude: f64) -> Option<f64> {
    let longitude = longitude.rem_euclid(360.0);

    coordinates.iter().find_map(|point| match point.as_slice() {
        [lon, lat, probability, ..] => {
            let lon_gap = (lon - longitude).abs();
            let lon_gap = lon_gap.min(360.0 - lon_gap);
            let lat_gap = (lat - latitude).abs();
            (lat_gap <= TOLERANCE_DEGREES && lon_gap <= TOLERANCE_DEGREES).then_some(*probability)
        }
        _ => None,
    })
}

pub struct AuroraSource {
    http: HttpFetcher,
    url: String,
}

impl AuroraSource {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn fetch(&self, query: &Query) -> SourceOutcome<f64> {
        match self.http.get_json::<OvationResponse>(&self.url, &[]).await {
            Ok(body) => SourceOutcome::from_option(find_probability(
                &body.coordinates,
                query.latitude,
                query.longitude,
            )),
            Err(e) => SourceOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IngestError;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_within_tolerance() {
        let grid = vec![vec![19.0, 61.5, 40.0], vec![18.5, 59.5, 7.0]];
        assert_eq!(find_probability(&grid, 60.0, 19.0), Some(7.0));
    }

    #[test]
    fn test_latitude_out_of_tolerance() {
        let grid = vec![vec![19.0, 61.5, 40.0]];
        assert_eq!(find_probability(&grid, 60.0, 19.0), None);
    }

    #[test]
    fn test_first_match_wins_over_nearest() {
        let grid = vec![vec![18.0, 59.0, 3.0], vec![19.0, 60.0, 9.0]];
        assert_eq!(find_probability(&grid, 60.0, 19.0), Some(3.0));
    }

    #[test]
    fn test_negative_longitude_normalized() {
        let grid = vec![vec![0.0, 64.0, 1.0], vec![338.0, 64.0, 12.0]];
        // Reykjavik area, -21.9 is 338.1 on the feed grid
        assert_eq!(find_probability(&grid, 64.1, -21.9), Some(12.0));
    }

    #[test]
    fn test_wraps_at_zero_meridian() {
        let grid = vec![vec![359.5, 51.5, 2.0]];
        assert_eq!(find_probability(&grid, 51.5, 0.1), Some(2.0));
    }

    #[test]
    fn test_short_rows_ignored() {
        let grid = vec![vec![18.5, 59.5], vec![18.5, 59.5, 4.0]];
        assert_eq!(find_probability(&grid, 60.0, 19.0), Some(4.0));
    }

    #[tokio::test]
    async fn test_body_without_coordinates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Observation Time": "2024-06-15T10:05:00Z"
            })))
            .mount(&server)
            .await;

        let http = HttpFetcher::new(std::time::Duration::from_secs(2), "wxfuse-test").unwrap();
        let source = AuroraSource::new(http, server.uri());
        let query = Query::new(60.0, 19.0, Utc.with_ymd_and_hms(2024, 6, 15, 10, 20, 0).unwrap());
        let outcome = source.fetch(&query).await;
        assert!(matches!(
            outcome,
            SourceOutcome::Failed(IngestError::Malformed(_))
        ));
    }
}
