//! WeatherAPI.com adapter (secondary weather source, sole air quality source)

use serde::Deserialize;
use tracing::debug;
use wxfuse_core::{
    flag_to_percent, icon_for, is_daytime, kph_to_mps, mbar_to_hpa, AirQualitySample,
    ForecastSeries, SourceReport, WeatherSample,
};

use crate::{HttpFetcher, IngestError, Query, SourceOutcome, WeatherSource};

const FORECAST_DAYS: &str = "2";

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherApiResponse {
    #[serde(default)]
    pub current: Option<Current>,
    #[serde(default)]
    pub forecast: Option<Forecast>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirQuality {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    #[serde(default)]
    pub hour: Vec<Hour>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hour {
    pub time_epoch: i64,
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub vis_km: Option<f64>,
    pub gust_kph: Option<f64>,
    pub wind_kph: Option<f64>,
    pub wind_degree: Option<f64>,
    pub pressure_mb: Option<f64>,
    pub cloud: Option<f64>,
    pub precip_mm: Option<f64>,
    pub chance_of_snow: Option<f64>,
    pub condition: Option<Condition>,
    pub uv: Option<f64>,
    pub feelslike_c: Option<f64>,
    pub dewpoint_c: Option<f64>,
    pub heatindex_c: Option<f64>,
    pub windchill_c: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub text: Option<String>,
}

impl From<&AirQuality> for AirQualitySample {
    fn from(aq: &AirQuality) -> Self {
        Self {
            pm2_5: aq.pm2_5,
            pm10: aq.pm10,
            o3: aq.o3,
            no2: aq.no2,
            so2: aq.so2,
            co: aq.co,
        }
    }
}

/// Normalize one forecast hour. This feed only says whether thunder is
/// expected, which becomes 0 or 100 percent.
pub fn to_sample(hour: &Hour, latitude: f64, longitude: f64) -> WeatherSample {
    let text = hour.condition.as_ref().and_then(|c| c.text.as_deref());
    let is_day = is_daytime(latitude, longitude, hour.time_epoch);

    WeatherSample {
        temperature: hour.temp_c,
        humidity: hour.humidity,
        visibility: hour.vis_km,
        gust: hour.gust_kph.map(kph_to_mps),
        wind_speed: hour.wind_kph.map(kph_to_mps),
        wind_direction: hour.wind_degree,
        pressure: hour.pressure_mb.map(mbar_to_hpa),
        cloudiness: hour.cloud,
        thunder_risk: text.map(|t| flag_to_percent(t.to_lowercase().contains("thunder"))),
        precipitation: hour.precip_mm,
        spp: hour.chance_of_snow,
        condition: text.map(str::to_string),
        uv_index: hour.uv,
        feels_like: hour.feelslike_c,
        dew_point: hour.dewpoint_c,
        heat_index: hour.heatindex_c,
        wind_chill: hour.windchill_c,
        icon: text.and_then(|t| icon_for(t, is_day)),
        ..WeatherSample::at(hour.time_epoch)
    }
}

pub fn to_report(body: &WeatherApiResponse, query: &Query) -> SourceReport {
    let forecast: ForecastSeries = body
        .forecast
        .iter()
        .flat_map(|f| f.forecastday.iter())
        .flat_map(|day| day.hour.iter())
        .filter(|hour| query.keeps(hour.time_epoch))
        .map(|hour| {
            (
                hour.time_epoch,
                to_sample(hour, query.latitude, query.longitude),
            )
        })
        .collect();

    let air_quality = body
        .current
        .as_ref()
        .and_then(|c| c.air_quality.as_ref())
        .map(AirQualitySample::from);

    SourceReport::from_forecast(forecast, air_quality)
}

pub struct WeatherApiSource {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherApiSource {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

#[async_trait::async_trait]
impl WeatherSource for WeatherApiSource {
    fn name(&self) -> &str {
        "weatherapi"
    }

    async fn fetch(&self, query: &Query) -> SourceOutcome<SourceReport> {
        let Some(key) = self.api_key() else {
            debug!("no WeatherAPI key configured, skipping");
            return SourceOutcome::Empty;
        };

        let url = format!("{}/v1/forecast.json", self.base_url.trim_end_matches('/'));
        let params = [
            ("key", key.to_string()),
            ("q", format!("{},{}", query.latitude, query.longitude)),
            ("days", FORECAST_DAYS.to_string()),
            ("aqi", "yes".to_string()),
            ("alerts", "no".to_string()),
        ];

        let body: WeatherApiResponse = match self.http.get_json(&url, &params).await {
            Ok(body) => body,
            Err(e) => return SourceOutcome::Failed(e),
        };

        if body.forecast.is_none() && body.current.is_none() {
            return SourceOutcome::Failed(IngestError::Malformed(
                "neither current nor forecast present".into(),
            ));
        }

        let report = to_report(&body, query);
        debug!(steps = report.forecast.len(), "WeatherAPI forecast normalized");

        if report.is_empty() {
            SourceOutcome::Empty
        } else {
            SourceOutcome::Data(report)
        }
    }
}
