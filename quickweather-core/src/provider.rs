use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Country code assumed when a by-name search leaves it out.
pub const DEFAULT_COUNTRY: &str = "de";

/// One weather lookup, either by place name or by coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    ByName { city: String, country: String },
    ByCoordinates { lat: f64, lon: f64 },
}

impl SearchQuery {
    /// By-name query; `country` falls back to [`DEFAULT_COUNTRY`].
    pub fn by_name(city: impl Into<String>, country: Option<String>) -> Self {
        Self::ByName {
            city: city.into(),
            country: country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        }
    }

    pub fn by_coordinates(lat: f64, lon: f64) -> Self {
        Self::ByCoordinates { lat, lon }
    }

    /// Reject queries that cannot form a valid request. Checked by every
    /// provider before any network call.
    pub fn validate(&self) -> Result<(), FetchError> {
        match self {
            Self::ByName { city, country } => {
                if city.trim().is_empty() {
                    return Err(FetchError::InvalidQuery("city name must not be empty".into()));
                }
                if country.trim().is_empty() {
                    return Err(FetchError::InvalidQuery("country code must not be empty".into()));
                }
            }
            Self::ByCoordinates { lat, lon } => {
                if !lat.is_finite() || !lon.is_finite() {
                    return Err(FetchError::InvalidQuery(
                        "latitude and longitude must be finite numbers".into(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Errors from the outbound weather lookup.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    #[error("failed to reach weather provider: {0}")]
    Network(#[from] reqwest::Error),

    #[error("weather provider returned status {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode weather provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of raw weather observations. The payload stays untyped at this
/// boundary; `normalize` turns it into a [`crate::SearchRecord`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &SearchQuery) -> Result<Value, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_name_defaults_country_code() {
        let query = SearchQuery::by_name("Hildesheim", None);

        assert_eq!(
            query,
            SearchQuery::ByName {
                city: "Hildesheim".to_string(),
                country: "de".to_string(),
            }
        );
    }

    #[test]
    fn by_name_keeps_explicit_country_code() {
        let query = SearchQuery::by_name("Lyon", Some("fr".to_string()));

        assert!(matches!(query, SearchQuery::ByName { country, .. } if country == "fr"));
    }

    #[test]
    fn empty_city_name_fails_validation() {
        let err = SearchQuery::by_name("  ", None).validate().unwrap_err();

        assert!(matches!(err, FetchError::InvalidQuery(_)));
        assert!(err.to_string().contains("city name"));
    }

    #[test]
    fn non_finite_coordinates_fail_validation() {
        let err = SearchQuery::by_coordinates(f64::NAN, 9.95).validate().unwrap_err();

        assert!(matches!(err, FetchError::InvalidQuery(_)));
    }

    #[test]
    fn well_formed_queries_pass_validation() {
        assert!(SearchQuery::by_name("Hildesheim", None).validate().is_ok());
        assert!(SearchQuery::by_coordinates(52.15, 9.95).validate().is_ok());
    }
}
