//! Field-level merge of source reports into one aggregate record
//!
//! Every merge step is an overlay: a field that already holds a value is
//! never replaced, a field that is unknown takes the incoming value. Running
//! sources through [`merge`] in a fixed order therefore gives the earliest
//! source precedence on every field it knows, and overlaying data onto itself
//! changes nothing.

use crate::types::{
    AggregateRecord, AirQualitySample, Aurora, ForecastSeries, Geomagnetic, Location,
    SourceReport, WeatherSample, WeatherSection,
};

/// Fill unknown fields of `self` from `other`, leaving known fields alone
pub trait Overlay {
    fn overlay(&mut self, other: &Self);
}

macro_rules! fill_unknown {
    ($dst:expr, $src:expr; $($field:ident),+ $(,)?) => {
        $(
            if $dst.$field.is_none() {
                $dst.$field = $src.$field.clone();
            }
        )+
    };
}

impl Overlay for WeatherSample {
    fn overlay(&mut self, other: &Self) {
        fill_unknown!(self, other;
            time,
            time_formatted,
            temperature,
            humidity,
            visibility,
            gust,
            wind_speed,
            wind_direction,
            pressure,
            cloudiness,
            thunder_risk,
            precipitation,
            spp,
            condition,
            uv_index,
            feels_like,
            dew_point,
            heat_index,
            wind_chill,
            icon,
        );
    }
}

impl Overlay for AirQualitySample {
    fn overlay(&mut self, other: &Self) {
        fill_unknown!(self, other; pm2_5, pm10, o3, no2, so2, co);
    }
}

impl Overlay for ForecastSeries {
    fn overlay(&mut self, other: &Self) {
        for (time, sample) in other {
            self.entry(*time)
                .or_insert_with(|| WeatherSample::at(*time))
                .overlay(sample);
        }
    }
}

impl Overlay for Location {
    fn overlay(&mut self, other: &Self) {
        if self.latitude.is_empty() {
            self.latitude = other.latitude.clone();
        }
        if self.longitude.is_empty() {
            self.longitude = other.longitude.clone();
        }
        fill_unknown!(self, other; place, generated_at);
    }
}

impl Overlay for WeatherSection {
    fn overlay(&mut self, other: &Self) {
        self.current.overlay(&other.current);
        self.forecast.overlay(&other.forecast);
    }
}

impl Overlay for Geomagnetic {
    fn overlay(&mut self, other: &Self) {
        fill_unknown!(self, other; kp_index);
    }
}

impl Overlay for Aurora {
    fn overlay(&mut self, other: &Self) {
        fill_unknown!(self, other; probability);
    }
}

impl Overlay for AggregateRecord {
    fn overlay(&mut self, other: &Self) {
        self.location.overlay(&other.location);
        self.weather.overlay(&other.weather);
        self.air_quality.overlay(&other.air_quality);
        self.geomagnetic.overlay(&other.geomagnetic);
        self.aurora.overlay(&other.aurora);
    }
}

impl AggregateRecord {
    /// Overlay one weather source's report onto this record
    pub fn overlay_report(&mut self, report: &SourceReport) {
        if let Some(current) = &report.current {
            self.weather.current.overlay(current);
        }
        if let Some(air_quality) = &report.air_quality {
            self.air_quality.overlay(air_quality);
        }
        self.weather.forecast.overlay(&report.forecast);
    }
}

/// Everything the merge needs, with sources listed in precedence order
#[derive(Debug, Clone, Default)]
pub struct MergeInputs {
    pub location: Location,
    pub primary: SourceReport,
    pub secondary: SourceReport,
    pub kp_index: Option<f64>,
    pub aurora_probability: Option<f64>,
}

/// Build the aggregate record. The primary report is overlaid before the
/// secondary one, so it wins every field both of them know.
pub fn merge(inputs: &MergeInputs) -> AggregateRecord {
    let mut record = AggregateRecord::default();

    record.location.overlay(&inputs.location);
    record.overlay_report(&inputs.primary);
    record.overlay_report(&inputs.secondary);
    record.geomagnetic.overlay(&Geomagnetic {
        kp_index: inputs.kp_index,
    });
    record.aurora.overlay(&Aurora {
        probability: inputs.aurora_probability,
    });

    record
}

/// Merge two finished records, `first` taking precedence
pub fn merge_records(first: &AggregateRecord, second: &AggregateRecord) -> AggregateRecord {
    let mut record = AggregateRecord::default();
    record.overlay(first);
    record.overlay(second);
    record
}
