//! SMHI point forecast adapter (primary weather source)
//!
//! Feed: `pmp3g` version 2. Each time step carries a list of named
//! parameters with one value each. Cloud cover arrives in okta and the
//! weather symbol as a `Wsymb2` code; both are normalized here.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use wxfuse_core::{
    icon_for, is_daytime, okta_to_percent, without_sentinel, ForecastSeries, SourceReport,
    WeatherSample, SMHI_MISSING,
};

use crate::{HttpFetcher, Query, SourceOutcome, WeatherSource};

#[derive(Debug, Clone, Deserialize)]
pub struct SmhiResponse {
    #[serde(rename = "timeSeries")]
    pub time_series: Vec<SmhiStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmhiStep {
    #[serde(rename = "validTime")]
    pub valid_time: DateTime<Utc>,
    #[serde(default)]
    pub parameters: Vec<SmhiParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmhiParameter {
    pub name: String,
    #[serde(default)]
    pub values: Vec<f64>,
}

impl SmhiStep {
    fn param(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.values.first().copied())
    }
}

/// `Wsymb2` weather symbol descriptions, code 1 first
const WSYMB2: [&str; 27] = [
    "Clear sky",
    "Nearly clear sky",
    "Variable cloudiness",
    "Halfclear sky",
    "Cloudy sky",
    "Overcast",
    "Fog",
    "Light rain showers",
    "Moderate rain showers",
    "Heavy rain showers",
    "Thunderstorm",
    "Light sleet showers",
    "Moderate sleet showers",
    "Heavy sleet showers",
    "Light snow showers",
    "Moderate snow showers",
    "Heavy snow showers",
    "Light rain",
    "Moderate rain",
    "Heavy rain",
    "Thunder",
    "Light sleet",
    "Moderate sleet",
    "Heavy sleet",
    "Light snowfall",
    "Moderate snowfall",
    "Heavy snowfall",
];

/// Description for a `Wsymb2` code
pub fn symbol_description(code: f64) -> Option<&'static str> {
    let index = code.round() as i64 - 1;
    usize::try_from(index).ok().and_then(|i| WSYMB2.get(i).copied())
}

/// Normalize one time step
pub fn to_sample(step: &SmhiStep, latitude: f64, longitude: f64) -> WeatherSample {
    let time = step.valid_time.timestamp();
    let condition = step.param("Wsymb2").and_then(symbol_description);
    let icon = condition.and_then(|text| icon_for(text, is_daytime(latitude, longitude, time)));

    WeatherSample {
        temperature: step.param("t"),
        humidity: step.param("r"),
        visibility: step.param("vis"),
        gust: step.param("gust"),
        wind_speed: step.param("ws"),
        wind_direction: step.param("wd"),
        pressure: step.param("msl"),
        cloudiness: step.param("tcc_mean").map(okta_to_percent),
        thunder_risk: step.param("tstm"),
        precipitation: step.param("pmean"),
        spp: step
            .param("spp")
            .and_then(|v| without_sentinel(v, SMHI_MISSING)),
        condition: condition.map(str::to_string),
        icon,
        ..WeatherSample::at(time)
    }
}

/// Normalize a whole response, dropping steps before the current hour
pub fn to_report(body: &SmhiResponse, query: &Query) -> SourceReport {
    let forecast: ForecastSeries = body
        .time_series
        .iter()
        .filter(|step| query.keeps(step.valid_time.timestamp()))
        .map(|step| {
            let sample = to_sample(step, query.latitude, query.longitude);
            (step.valid_time.timestamp(), sample)
        })
        .collect();

    SourceReport::from_forecast(forecast, None)
}

pub struct SmhiSource {
    http: HttpFetcher,
    base_url: String,
}

impl SmhiSource {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, query: &Query) -> String {
        format!(
            "{}/api/category/pmp3g/version/2/geotype/point/lon/{:.6}/lat/{:.6}/data.json",
            self.base_url.trim_end_matches('/'),
            query.longitude,
            query.latitude
        )
    }
}

#[async_trait::async_trait]
impl WeatherSource for SmhiSource {
    fn name(&self) -> &str {
        "smhi"
    }

    async fn fetch(&self, query: &Query) -> SourceOutcome<SourceReport> {
        let body: SmhiResponse = match self.http.get_json(&self.url(query), &[]).await {
            Ok(body) => body,
            Err(e) => return SourceOutcome::Failed(e),
        };

        let report = to_report(&body, query);
        debug!(steps = report.forecast.len(), "SMHI forecast normalized");

        if report.is_empty() {
            SourceOutcome::Empty
        } else {
            SourceOutcome::Data(report)
        }
    }
}
