//! Core data types for the aggregate weather record

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::icons::Icon;

/// Timestamp type (Unix epoch seconds)
pub type Timestamp = i64;

/// Display format used for `time_formatted` (UTC)
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Forecast samples keyed by their valid time
pub type ForecastSeries = BTreeMap<Timestamp, WeatherSample>;

/// One point-in-time weather observation or forecast step.
///
/// Every field is optional: `None` means the source did not supply it and is
/// serialized as `null`, which keeps it distinct from a real zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    pub time: Option<Timestamp>,
    #[serde(rename = "time_formatted")]
    pub time_formatted: Option<String>,
    /// Air temperature (°C)
    pub temperature: Option<f64>,
    /// Relative humidity (%)
    pub humidity: Option<f64>,
    /// Visibility (km)
    pub visibility: Option<f64>,
    /// Wind gust (m/s)
    pub gust: Option<f64>,
    /// Mean wind speed (m/s)
    pub wind_speed: Option<f64>,
    /// Wind direction (degrees, 0-360)
    pub wind_direction: Option<f64>,
    /// Sea level pressure (hPa)
    pub pressure: Option<f64>,
    /// Total cloud cover (%)
    pub cloudiness: Option<f64>,
    /// Thunder probability (%). Sources that only report yes/no map to 0/100.
    pub thunder_risk: Option<f64>,
    /// Precipitation (mm)
    pub precipitation: Option<f64>,
    /// Share of precipitation falling as snow or ice (%)
    pub spp: Option<f64>,
    pub condition: Option<String>,
    pub uv_index: Option<f64>,
    pub feels_like: Option<f64>,
    pub dew_point: Option<f64>,
    pub heat_index: Option<f64>,
    pub wind_chill: Option<f64>,
    pub icon: Option<Icon>,
}

impl WeatherSample {
    /// Empty sample stamped with `time` and its display string
    pub fn at(time: Timestamp) -> Self {
        Self {
            time: Some(time),
            time_formatted: format_timestamp(time),
            ..Self::default()
        }
    }
}

/// Air quality concentrations (µg/m³)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySample {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
}

/// Where and when a record was generated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude, two decimals
    pub latitude: String,
    /// Longitude, two decimals
    pub longitude: String,
    pub place: Option<String>,
    pub generated_at: Option<Timestamp>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: format_coordinate(latitude),
            longitude: format_coordinate(longitude),
            place: None,
            generated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSection {
    pub current: WeatherSample,
    pub forecast: ForecastSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geomagnetic {
    pub kp_index: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aurora {
    /// Probability of visible aurora (%)
    pub probability: Option<f64>,
}

/// The unified record returned to callers and stored in the cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub location: Location,
    pub weather: WeatherSection,
    pub air_quality: AirQualitySample,
    pub geomagnetic: Geomagnetic,
    pub aurora: Aurora,
}

/// What a single weather source contributed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceReport {
    pub current: Option<WeatherSample>,
    pub forecast: ForecastSeries,
    pub air_quality: Option<AirQualitySample>,
}

impl SourceReport {
    /// Build a report whose current sample is the earliest forecast step
    pub fn from_forecast(forecast: ForecastSeries, air_quality: Option<AirQualitySample>) -> Self {
        let current = forecast.values().next().cloned();
        Self {
            current,
            forecast,
            air_quality,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.forecast.is_empty() && self.air_quality.is_none()
    }
}

/// Format a coordinate the way it appears in records and cache keys
pub fn format_coordinate(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    // Values that round to zero from below would otherwise keep their sign
    match formatted.as_str() {
        "-0.00" => "0.00".to_string(),
        _ => formatted,
    }
}

/// Render a Unix timestamp as `YYYY-MM-DD HH:MM` (UTC)
pub fn format_timestamp(time: Timestamp) -> Option<String> {
    DateTime::from_timestamp(time, 0).map(|dt| dt.format(TIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_serialize_as_null() {
        let sample = WeatherSample {
            temperature: Some(0.0),
            ..WeatherSample::default()
        };
        let value = serde_json::to_value(&sample).unwrap();

        assert_eq!(value["temperature"], serde_json::json!(0.0));
        assert!(value["humidity"].is_null());
        assert!(value.get("windSpeed").is_some());
        assert!(value.get("time_formatted").is_some());
    }

    #[test]
    fn test_sample_at_sets_time() {
        let sample = WeatherSample::at(1718449200);
        assert_eq!(sample.time, Some(1718449200));
        assert_eq!(sample.time_formatted.as_deref(), Some("2024-06-15 11:00"));
        assert_eq!(sample.temperature, None);
    }

    #[test]
    fn test_location_pads_coordinates() {
        let loc = Location::new(59.1272412, 18.1);
        assert_eq!(loc.latitude, "59.13");
        assert_eq!(loc.longitude, "18.10");
    }

    #[test]
    fn test_coordinate_rounding_to_zero_drops_sign() {
        assert_eq!(format_coordinate(-0.001), "0.00");
        assert_eq!(format_coordinate(-0.0), "0.00");
        assert_eq!(format_coordinate(0.001), "0.00");
        assert_eq!(format_coordinate(-0.006), "-0.01");
        assert_eq!(Location::new(-0.001, 0.0).latitude, "0.00");
    }

    #[test]
    fn test_report_current_is_earliest_step() {
        let mut forecast = ForecastSeries::new();
        forecast.insert(200, WeatherSample::at(200));
        forecast.insert(100, WeatherSample::at(100));

        let report = SourceReport::from_forecast(forecast, None);
        assert_eq!(report.current.and_then(|s| s.time), Some(100));
    }

    #[test]
    fn test_record_serde_keeps_forecast_keys() {
        let mut record = AggregateRecord::default();
        record
            .weather
            .forecast
            .insert(1718449200, WeatherSample::at(1718449200));

        let json = serde_json::to_string(&record).unwrap();
        let back: AggregateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
