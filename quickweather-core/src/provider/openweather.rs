use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{FetchError, SearchQuery, WeatherProvider};

const API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Client for the OpenWeatherMap current-weather endpoint.
///
/// Returns the provider payload as raw JSON; extraction and defaulting live
/// in [`crate::normalize`].
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    lang: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, lang: String) -> Self {
        Self {
            api_key,
            lang,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, query: &SearchQuery) -> Result<Value, FetchError> {
        query.validate()?;

        let mut request = self.http.get(API_URL).query(&[
            ("appid", self.api_key.as_str()),
            ("units", "metric"),
            ("lang", self.lang.as_str()),
        ]);

        request = match query {
            SearchQuery::ByName { city, country } => {
                request.query(&[("q", format!("{city},{country}"))])
            }
            SearchQuery::ByCoordinates { lat, lon } => {
                request.query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            }
        };

        let res = request.send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Provider {
                status,
                body: truncate_body(&body),
            });
        }

        let raw: Value = serde_json::from_str(&body)?;

        Ok(raw)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_query_fails_before_any_request() {
        // Nothing listens on this key or host; an attempted request would
        // surface as a network error, not InvalidQuery.
        let client = OpenWeatherClient::new("unused".to_string(), "en".to_string());

        let err = client
            .fetch(&SearchQuery::by_name("", None))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidQuery(_)));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);

        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }
}
