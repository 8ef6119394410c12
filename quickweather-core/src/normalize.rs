//! Turns raw provider payloads into canonical [`SearchRecord`]s.
//!
//! Extraction never fails: every field is optional in the raw schema and
//! falls back to its documented default independently of the others.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{
    Coordinates, LocalTimes, MIDNIGHT, NO_DESCRIPTION, SearchRecord, TemperatureSummary,
    UNKNOWN_PLACE,
};

/// All-optional mirror of the OpenWeatherMap current-weather payload.
/// Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    weather: Option<Vec<RawCondition>>,
    main: Option<RawMain>,
    coord: Option<RawCoord>,
    wind: Option<RawWind>,
    sys: Option<RawSys>,
    /// Shift from UTC in seconds.
    timezone: Option<i64>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCoord {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWind {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

/// Normalize a raw payload, reading the clock for the current-time field.
pub fn normalize(raw: &Value) -> SearchRecord {
    normalize_at(raw, Utc::now())
}

/// Normalize a raw payload with a pinned clock.
///
/// A payload that does not deserialize at all degrades to the empty schema,
/// which yields the fully-defaulted record.
pub fn normalize_at(raw: &Value, now: DateTime<Utc>) -> SearchRecord {
    let payload = RawPayload::deserialize(raw).unwrap_or_default();

    let offset = payload.timezone.unwrap_or(0);
    let main = payload.main.unwrap_or_default();
    let coord = payload.coord.unwrap_or_default();
    let sys = payload.sys.unwrap_or_default();

    let description = payload
        .weather
        .as_ref()
        .and_then(|conditions| conditions.first())
        .and_then(|condition| condition.description.clone())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    SearchRecord {
        city_name: payload.name.unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
        country_code: sys.country.unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
        coordinates: Coordinates {
            lat: coord.lat.unwrap_or(0.0),
            lon: coord.lon.unwrap_or(0.0),
        },
        description,
        temperature: TemperatureSummary {
            current: main.temp.unwrap_or(0.0),
            feels_like: main.feels_like.unwrap_or(0.0),
            min: main.temp_min.unwrap_or(0.0),
            max: main.temp_max.unwrap_or(0.0),
        },
        wind_speed: payload.wind.unwrap_or_default().speed.unwrap_or(0.0),
        time: LocalTimes {
            current: shifted_hhmm(now, offset),
            sunrise: sys
                .sunrise
                .and_then(|epoch| epoch_hhmm(epoch, offset))
                .unwrap_or_else(|| MIDNIGHT.to_string()),
            sunset: sys
                .sunset
                .and_then(|epoch| epoch_hhmm(epoch, offset))
                .unwrap_or_else(|| MIDNIGHT.to_string()),
        },
    }
}

/// Shift a UTC instant by the provider offset and format as `HH:MM`.
fn shifted_hhmm(utc: DateTime<Utc>, offset_secs: i64) -> String {
    (utc + Duration::seconds(offset_secs)).format("%H:%M").to_string()
}

fn epoch_hhmm(epoch: i64, offset_secs: i64) -> Option<String> {
    DateTime::from_timestamp(epoch, 0).map(|utc| shifted_hhmm(utc, offset_secs))
}
