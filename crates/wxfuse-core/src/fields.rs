//! Catalog of the canonical record fields

use serde::Serialize;

use crate::units::Unit;

/// Record section a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSection {
    Weather,
    AirQuality,
    Geomagnetic,
    Aurora,
}

impl FieldSection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::AirQuality => "air_quality",
            Self::Geomagnetic => "geomagnetic",
            Self::Aurora => "aurora",
        }
    }
}

/// Description of one canonical field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldInfo {
    pub section: FieldSection,
    /// Name as it appears in the serialized record
    pub name: &'static str,
    pub unit: Unit,
    pub description: &'static str,
}

const fn field(
    section: FieldSection,
    name: &'static str,
    unit: Unit,
    description: &'static str,
) -> FieldInfo {
    FieldInfo {
        section,
        name,
        unit,
        description,
    }
}

const FIELDS: &[FieldInfo] = &[
    field(FieldSection::Weather, "time", Unit::UnixSeconds, "Valid time of the sample"),
    field(FieldSection::Weather, "time_formatted", Unit::Text, "Valid time as YYYY-MM-DD HH:MM (UTC)"),
    field(FieldSection::Weather, "temperature", Unit::Celsius, "Air temperature"),
    field(FieldSection::Weather, "humidity", Unit::Percent, "Relative humidity"),
    field(FieldSection::Weather, "visibility", Unit::Kilometre, "Horizontal visibility"),
    field(FieldSection::Weather, "gust", Unit::MetresPerSecond, "Wind gust speed"),
    field(FieldSection::Weather, "windSpeed", Unit::MetresPerSecond, "Mean wind speed"),
    field(FieldSection::Weather, "windDirection", Unit::Degrees, "Direction the wind blows from"),
    field(FieldSection::Weather, "pressure", Unit::Hectopascal, "Air pressure at sea level"),
    field(FieldSection::Weather, "cloudiness", Unit::Percent, "Total cloud cover"),
    field(FieldSection::Weather, "thunderRisk", Unit::Percent, "Probability of thunder"),
    field(FieldSection::Weather, "precipitation", Unit::Millimetre, "Precipitation amount"),
    field(FieldSection::Weather, "spp", Unit::Percent, "Share of precipitation falling as snow or ice"),
    field(FieldSection::Weather, "condition", Unit::Text, "Provider description of the sky"),
    field(FieldSection::Weather, "uvIndex", Unit::Index, "UV index"),
    field(FieldSection::Weather, "feelsLike", Unit::Celsius, "Apparent temperature"),
    field(FieldSection::Weather, "dewPoint", Unit::Celsius, "Dew point"),
    field(FieldSection::Weather, "heatIndex", Unit::Celsius, "Heat index"),
    field(FieldSection::Weather, "windChill", Unit::Celsius, "Wind chill"),
    field(FieldSection::Weather, "icon", Unit::Text, "Icon name"),
    field(FieldSection::AirQuality, "pm2_5", Unit::MicrogramsPerCubicMetre, "Fine particulate matter"),
    field(FieldSection::AirQuality, "pm10", Unit::MicrogramsPerCubicMetre, "Coarse particulate matter"),
    field(FieldSection::AirQuality, "o3", Unit::MicrogramsPerCubicMetre, "Ozone"),
    field(FieldSection::AirQuality, "no2", Unit::MicrogramsPerCubicMetre, "Nitrogen dioxide"),
    field(FieldSection::AirQuality, "so2", Unit::MicrogramsPerCubicMetre, "Sulphur dioxide"),
    field(FieldSection::AirQuality, "co", Unit::MicrogramsPerCubicMetre, "Carbon monoxide"),
    field(FieldSection::Geomagnetic, "kp_index", Unit::Index, "Latest planetary K index"),
    field(FieldSection::Aurora, "probability", Unit::Percent, "Chance of visible aurora nearby"),
];

/// All canonical fields in record order
pub fn catalog() -> &'static [FieldInfo] {
    FIELDS
}
