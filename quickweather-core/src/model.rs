use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default for city and country when the provider omits them.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// Default weather description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Default for local time strings.
pub const MIDNIGHT: &str = "00:00";

/// Geographic position reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Temperature block of a single observation, in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

/// Wall-clock strings at the observed location, already shifted by the
/// provider's UTC offset and formatted as zero-padded 24-hour `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTimes {
    pub current: String,
    pub sunrise: String,
    pub sunset: String,
}

impl Default for LocalTimes {
    fn default() -> Self {
        Self {
            current: MIDNIGHT.to_string(),
            sunrise: MIDNIGHT.to_string(),
            sunset: MIDNIGHT.to_string(),
        }
    }
}

/// Canonical result of one weather query, with every field defaulted when
/// the provider payload lacked it. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub city_name: String,
    pub country_code: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub temperature: TemperatureSummary,
    pub wind_speed: f64,
    pub time: LocalTimes,
}

impl Default for SearchRecord {
    fn default() -> Self {
        Self {
            city_name: UNKNOWN_PLACE.to_string(),
            country_code: UNKNOWN_PLACE.to_string(),
            coordinates: Coordinates::default(),
            description: NO_DESCRIPTION.to_string(),
            temperature: TemperatureSummary::default(),
            wind_speed: 0.0,
            time: LocalTimes::default(),
        }
    }
}

impl SearchRecord {
    /// Names of fields that make the record unstorable: blank strings or
    /// non-finite numbers. Empty for every record `normalize` produces.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        let texts = [
            ("city_name", &self.city_name),
            ("country_code", &self.country_code),
            ("description", &self.description),
            ("local_time", &self.time.current),
            ("sunrise", &self.time.sunrise),
            ("sunset", &self.time.sunset),
        ];
        for (name, value) in texts {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }

        let numbers = [
            ("lat", self.coordinates.lat),
            ("lon", self.coordinates.lon),
            ("temperature", self.temperature.current),
            ("feels_like", self.temperature.feels_like),
            ("min_temp", self.temperature.min),
            ("max_temp", self.temperature.max),
            ("wind_speed", self.wind_speed),
        ];
        for (name, value) in numbers {
            if !value.is_finite() {
                missing.push(name);
            }
        }

        missing
    }
}

/// A persisted search, as stored in the `search_result` table. The store
/// assigns `id` and `timestamp` at insert time; the record is passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub record: SearchRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaulted_record_is_complete() {
        assert!(SearchRecord::default().missing_fields().is_empty());
    }

    #[test]
    fn blank_city_name_is_reported_missing() {
        let record = SearchRecord {
            city_name: "   ".to_string(),
            ..SearchRecord::default()
        };

        assert_eq!(record.missing_fields(), vec!["city_name"]);
    }

    #[test]
    fn non_finite_numbers_are_reported_missing() {
        let record = SearchRecord {
            wind_speed: f64::NAN,
            coordinates: Coordinates {
                lat: f64::INFINITY,
                lon: 9.95,
            },
            ..SearchRecord::default()
        };

        let missing = record.missing_fields();
        assert_eq!(missing, vec!["lat", "wind_speed"]);
    }
}
