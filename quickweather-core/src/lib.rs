//! Core library for the QuickWeather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider abstraction and the OpenWeatherMap client
//! - Normalization of raw payloads into canonical search records
//! - The durable search history store and its in-memory mirror
//!
//! It is used by `quickweather-cli`, but can also be reused by other
//! binaries or services.

pub mod config;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod store;

pub use config::Config;
pub use model::{Coordinates, LocalTimes, SearchRecord, SearchRow, TemperatureSummary};
pub use normalize::{normalize, normalize_at};
pub use provider::{FetchError, SearchQuery, WeatherProvider, openweather::OpenWeatherClient};
pub use store::{SearchStore, StoreError, init_database};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    /// Stand-in provider returning a fixed Hildesheim payload.
    #[derive(Debug)]
    struct FixtureProvider;

    #[async_trait]
    impl WeatherProvider for FixtureProvider {
        async fn fetch(&self, query: &SearchQuery) -> Result<Value, FetchError> {
            query.validate()?;

            Ok(json!({
                "coord": { "lon": 9.95, "lat": 52.15 },
                "weather": [
                    { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }
                ],
                "main": {
                    "temp": 21.4,
                    "feels_like": 21.0,
                    "temp_min": 19.8,
                    "temp_max": 23.1
                },
                "wind": { "speed": 3.6 },
                "sys": { "country": "DE", "sunrise": 1_717_210_800i64, "sunset": 1_717_270_200i64 },
                "timezone": 7200,
                "name": "Hildesheim"
            }))
        }
    }

    #[tokio::test]
    async fn search_pipeline_fetches_normalizes_and_persists() {
        let provider = FixtureProvider;

        let query = SearchQuery::by_name("Hildesheim", None);
        assert!(matches!(&query, SearchQuery::ByName { country, .. } if country == "de"));

        let raw = provider.fetch(&query).await.expect("fixture fetch");
        let record = normalize(&raw);

        assert_eq!(record.city_name, "Hildesheim");
        assert_eq!(record.country_code, "DE");
        assert_eq!(record.temperature.current, 21.4);
        assert_eq!(record.temperature.feels_like, 21.0);
        assert_eq!(record.temperature.min, 19.8);
        assert_eq!(record.temperature.max, 23.1);
        assert_eq!(record.time.sunrise, "05:00");
        assert_eq!(record.time.sunset, "21:30");

        let mut store = SearchStore::open_in_memory().expect("in-memory store");
        let row = store.append(&record).expect("append");

        let latest = store.most_recent().expect("row present");
        assert_eq!(latest.id, row.id);
        assert_eq!(latest.record, record);
    }

    #[tokio::test]
    async fn invalid_query_is_rejected_by_the_stub_too() {
        let err = FixtureProvider
            .fetch(&SearchQuery::by_name("", None))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidQuery(_)));
    }
}
