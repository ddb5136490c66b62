//! Condition text to icon classification
//!
//! Providers describe the sky in free text (or in codes that adapters turn
//! into text). The text is scanned against [`CONDITION_KEYWORDS`] in declared
//! order and the first keyword found decides the condition, so more specific
//! keywords must come before the generic ones they contain.

use serde::{Deserialize, Serialize};

/// Icon names shared by every source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Sleet,
    Snow,
    Thunderstorm,
}

impl Icon {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClearDay => "clear-day",
            Self::ClearNight => "clear-night",
            Self::PartlyCloudyDay => "partly-cloudy-day",
            Self::PartlyCloudyNight => "partly-cloudy-night",
            Self::Cloudy => "cloudy",
            Self::Overcast => "overcast",
            Self::Fog => "fog",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::HeavyRain => "heavy-rain",
            Self::Sleet => "sleet",
            Self::Snow => "snow",
            Self::Thunderstorm => "thunderstorm",
        }
    }
}

/// Sky condition before day/night is taken into account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionClass {
    Clear,
    PartlyCloudy,
    Cloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Sleet,
    Snow,
    Thunderstorm,
}

impl ConditionClass {
    pub fn icon(&self, is_day: bool) -> Icon {
        match (self, is_day) {
            (Self::Clear, true) => Icon::ClearDay,
            (Self::Clear, false) => Icon::ClearNight,
            (Self::PartlyCloudy, true) => Icon::PartlyCloudyDay,
            (Self::PartlyCloudy, false) => Icon::PartlyCloudyNight,
            (Self::Cloudy, _) => Icon::Cloudy,
            (Self::Overcast, _) => Icon::Overcast,
            (Self::Fog, _) => Icon::Fog,
            (Self::Drizzle, _) => Icon::Drizzle,
            (Self::Rain, _) => Icon::Rain,
            (Self::HeavyRain, _) => Icon::HeavyRain,
            (Self::Sleet, _) => Icon::Sleet,
            (Self::Snow, _) => Icon::Snow,
            (Self::Thunderstorm, _) => Icon::Thunderstorm,
        }
    }
}

/// Lowercase keywords in match order. First hit wins.
pub const CONDITION_KEYWORDS: &[(&str, ConditionClass)] = &[
    ("thunder", ConditionClass::Thunderstorm),
    ("fog", ConditionClass::Fog),
    ("mist", ConditionClass::Fog),
    ("sleet", ConditionClass::Sleet),
    ("ice pellets", ConditionClass::Sleet),
    ("freezing", ConditionClass::Sleet),
    ("blizzard", ConditionClass::Snow),
    ("snow", ConditionClass::Snow),
    ("heavy rain", ConditionClass::HeavyRain),
    ("torrential", ConditionClass::HeavyRain),
    ("drizzle", ConditionClass::Drizzle),
    ("rain", ConditionClass::Rain),
    ("shower", ConditionClass::Rain),
    ("overcast", ConditionClass::Overcast),
    ("variable cloudiness", ConditionClass::PartlyCloudy),
    ("halfclear", ConditionClass::PartlyCloudy),
    ("nearly clear", ConditionClass::PartlyCloudy),
    ("partly", ConditionClass::PartlyCloudy),
    ("cloudy", ConditionClass::Cloudy),
    ("clear", ConditionClass::Clear),
    ("sunny", ConditionClass::Clear),
];

/// Classify free text, `None` when no keyword matches
pub fn classify_condition(text: &str) -> Option<ConditionClass> {
    let text = text.to_lowercase();
    CONDITION_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, class)| *class)
}

/// Icon for a condition text at a given time of day
pub fn icon_for(text: &str, is_day: bool) -> Option<Icon> {
    classify_condition(text).map(|class| class.icon(is_day))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_keyword_beats_generic() {
        assert_eq!(
            classify_condition("Patchy light rain with thunder"),
            Some(ConditionClass::Thunderstorm)
        );
        assert_eq!(
            classify_condition("Partly cloudy"),
            Some(ConditionClass::PartlyCloudy)
        );
        assert_eq!(
            classify_condition("Nearly clear sky"),
            Some(ConditionClass::PartlyCloudy)
        );
        assert_eq!(classify_condition("Freezing fog"), Some(ConditionClass::Fog));
        assert_eq!(
            classify_condition("Light freezing rain"),
            Some(ConditionClass::Sleet)
        );
    }

    #[test]
    fn test_heavy_rain_variants() {
        assert_eq!(
            classify_condition("Heavy rain showers"),
            Some(ConditionClass::HeavyRain)
        );
        assert_eq!(
            classify_condition("Moderate or heavy rain shower"),
            Some(ConditionClass::HeavyRain)
        );
        assert_eq!(
            classify_condition("Moderate rain showers"),
            Some(ConditionClass::Rain)
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify_condition("SUNNY"), Some(ConditionClass::Clear));
        assert_eq!(classify_condition("Overcast"), Some(ConditionClass::Overcast));
    }

    #[test]
    fn test_unknown_text() {
        assert_eq!(classify_condition("volcanic ash"), None);
        assert_eq!(icon_for("", true), None);
    }

    #[test]
    fn test_day_night_icons() {
        assert_eq!(icon_for("Clear sky", true), Some(Icon::ClearDay));
        assert_eq!(icon_for("Clear sky", false), Some(Icon::ClearNight));
        assert_eq!(icon_for("Partly cloudy", false), Some(Icon::PartlyCloudyNight));
        assert_eq!(icon_for("Cloudy sky", false), Some(Icon::Cloudy));
    }

    #[test]
    fn test_icon_serializes_as_name() {
        for icon in [Icon::ClearDay, Icon::PartlyCloudyNight, Icon::HeavyRain] {
            let json = serde_json::to_string(&icon).unwrap();
            assert_eq!(json, format!("\"{}\"", icon.name()));
        }
    }
}
