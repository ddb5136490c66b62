//! Unit conversion utilities
//!
//! Everything leaving an adapter is in canonical units: °C, %, km, m/s,
//! degrees, hPa and mm.

use serde::Serialize;

/// Missing-value marker used by SMHI for percentage parameters
pub const SMHI_MISSING: f64 = -9.0;

const KPH_PER_MPS: f64 = 3.6;
const OKTA_MAX: f64 = 8.0;

/// Canonical unit of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    Celsius,
    Percent,
    Kilometre,
    MetresPerSecond,
    Degrees,
    Hectopascal,
    Millimetre,
    MicrogramsPerCubicMetre,
    Index,
    UnixSeconds,
    Text,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Percent => "%",
            Self::Kilometre => "km",
            Self::MetresPerSecond => "m/s",
            Self::Degrees => "°",
            Self::Hectopascal => "hPa",
            Self::Millimetre => "mm",
            Self::MicrogramsPerCubicMetre => "µg/m³",
            Self::Index => "index",
            Self::UnixSeconds => "s",
            Self::Text => "",
        }
    }
}

/// km/h to m/s, one decimal
pub fn kph_to_mps(kph: f64) -> f64 {
    round_to(kph / KPH_PER_MPS, 1)
}

/// Millibar and hectopascal are the same quantity
pub fn mbar_to_hpa(mbar: f64) -> f64 {
    mbar
}

/// Cloud cover in eighths of sky (okta) to percent
pub fn okta_to_percent(okta: f64) -> f64 {
    (okta / OKTA_MAX) * 100.0
}

/// Yes/no flags become 0 or 100 percent
pub fn flag_to_percent(flag: bool) -> f64 {
    if flag {
        100.0
    } else {
        0.0
    }
}

/// Map a provider sentinel to unknown
pub fn without_sentinel(value: f64, sentinel: f64) -> Option<f64> {
    if value == sentinel {
        None
    } else {
        Some(value)
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
