//! Day/night classification from sunrise and sunset

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::types::Timestamp;

/// Whether the sun is up at `time` for the given coordinates.
///
/// Sunrise/sunset windows are computed for the UTC date of `time` and the
/// days either side, since far from Greenwich a local day straddles two UTC
/// dates. Without any window the sun neither rises nor sets, and its
/// elevation at solar noon tells polar day from polar night. Coordinates the
/// solar calculation rejects fall back to the local solar hour.
pub fn is_daytime(latitude: f64, longitude: f64, time: Timestamp) -> bool {
    let Some(at) = DateTime::from_timestamp(time, 0) else {
        return true;
    };

    if Coordinates::new(latitude, longitude).is_none() {
        return solar_hour_is_day(longitude, at);
    }

    let date = at.date_naive();
    let windows: Vec<(DateTime<Utc>, DateTime<Utc>)> = [date.pred_opt(), Some(date), date.succ_opt()]
        .into_iter()
        .flatten()
        .filter_map(|day| daylight_window(latitude, longitude, day))
        .collect();

    if windows.is_empty() {
        return noon_elevation(latitude, date) > 0.0;
    }

    windows.iter().any(|(rise, set)| at >= *rise && at < *set)
}

fn daylight_window(
    latitude: f64,
    longitude: f64,
    date: NaiveDate,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let coords = Coordinates::new(latitude, longitude)?;
    let day = SolarDay::new(coords, date);
    let rise = day.event_time(SolarEvent::Sunrise);
    let set = day.event_time(SolarEvent::Sunset);

    let length = set - rise;
    if length > Duration::zero() && length < Duration::hours(24) {
        Some((rise, set))
    } else {
        None
    }
}

/// Approximate solar declination in degrees for a date
fn declination(date: NaiveDate) -> f64 {
    let day_of_year = date.ordinal() as f64;
    -23.44 * (2.0 * std::f64::consts::PI / 365.0 * (day_of_year + 10.0)).cos()
}

/// Sun elevation at solar noon in degrees
fn noon_elevation(latitude: f64, date: NaiveDate) -> f64 {
    90.0 - (latitude - declination(date)).abs()
}

fn solar_hour_is_day(longitude: f64, at: DateTime<Utc>) -> bool {
    let utc_hour = at.hour() as f64 + at.minute() as f64 / 60.0;
    let solar_hour = (utc_hour + longitude / 15.0).rem_euclid(24.0);
    (6.0..18.0).contains(&solar_hour)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-06-15 11:00 and 23:00 UTC
    const MIDSUMMER_NOON: Timestamp = 1718449200;
    const MIDSUMMER_NIGHT: Timestamp = 1718492400;

    #[test]
    fn test_stockholm_midsummer() {
        assert!(is_daytime(59.13, 18.10, MIDSUMMER_NOON));
        assert!(!is_daytime(59.13, 18.10, MIDSUMMER_NIGHT));
    }

    #[test]
    fn test_equator() {
        // 2024-03-20 12:00 and 00:00 UTC
        assert!(is_daytime(0.0, 0.0, 1710936000));
        assert!(!is_daytime(0.0, 0.0, 1710892800));
    }

    #[test]
    fn test_far_east_window_on_previous_utc_date() {
        // Sydney, 2024-06-15 22:00 UTC is 08:00 local, after sunrise
        assert!(is_daytime(-33.87, 151.21, 1718488800));
        // 2024-06-15 10:00 UTC is 20:00 local
        assert!(!is_daytime(-33.87, 151.21, 1718445600));
    }

    #[test]
    fn test_midnight_sun_is_day() {
        // Tromsø, 2024-06-21 00:00 UTC
        assert!(is_daytime(69.65, 18.96, 1718928000));
    }

    #[test]
    fn test_polar_night_is_night() {
        // Tromsø, 2024-12-21 11:00 UTC, close to solar noon
        assert!(!is_daytime(69.65, 18.96, 1734778800));
    }

    #[test]
    fn test_noon_elevation_by_season() {
        let june = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let december = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        assert!(noon_elevation(69.65, june) > 0.0);
        assert!(noon_elevation(69.65, december) < 0.0);
        assert!(noon_elevation(-80.0, december) > 0.0);
        assert!(noon_elevation(-80.0, june) < 0.0);
    }

    #[test]
    fn test_invalid_coordinates_fall_back_to_solar_hour() {
        assert!(is_daytime(95.0, 0.0, MIDSUMMER_NOON));
        assert!(!is_daytime(95.0, 0.0, MIDSUMMER_NIGHT));
    }
}
