//! Interactive search loop and terminal rendering.

use anyhow::Result;
use inquire::{CustomType, Select, Text};
use serde_json::Value;

use quickweather_core::{
    Config, Coordinates, OpenWeatherClient, SearchQuery, SearchRecord, SearchRow, SearchStore,
    WeatherProvider, normalize,
};

const CITY_MODE: &str = "city name and country code";
const GEO_MODE: &str = "geolocation";
const QUIT: &str = "quit";

/// Run the dashboard until the user quits.
///
/// An unavailable store is logged and tolerated: searches still run and
/// render, they just are not recorded.
pub async fn run(config: Config) -> Result<()> {
    let api_key = config.require_api_key()?.to_owned();
    let client = OpenWeatherClient::new(api_key, config.lang.clone());

    let mut store = match SearchStore::open(&config.db_path) {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::error!(%err, "search history unavailable; run `quickweather init` to create it");
            None
        }
    };

    println!("QuickWeather");
    println!("Local time and weather information");

    loop {
        println!();
        let mode = Select::new("Search mode:", vec![CITY_MODE, GEO_MODE, QUIT]).prompt()?;

        let query = match mode {
            CITY_MODE => {
                let city = Text::new("City name:").with_default("Hildesheim").prompt()?;
                let country = Text::new("Country code:").with_default("de").prompt()?;
                SearchQuery::by_name(city, Some(country))
            }
            GEO_MODE => {
                let lat = CustomType::<f64>::new("Latitude:").prompt()?;
                let lon = CustomType::<f64>::new("Longitude:").prompt()?;
                SearchQuery::by_coordinates(lat, lon)
            }
            _ => return Ok(()),
        };

        let raw = match client.fetch(&query).await {
            Ok(raw) => raw,
            Err(err) => {
                // Render defaults rather than aborting the session.
                tracing::warn!(%err, "weather lookup failed");
                Value::Null
            }
        };
        let record = normalize(&raw);

        match store.as_mut() {
            Some(store) => match store.append(&record) {
                Ok(row) => render_latest(&row),
                Err(err) => {
                    tracing::warn!(%err, "search entry not recorded");
                    render_record(&record);
                }
            },
            None => render_record(&record),
        }

        if let Some(store) = store.as_ref() {
            render_history(store.all());
        }
    }
}

fn render_latest(row: &SearchRow) {
    println!();
    println!(
        "Search #{} at {}",
        row.id,
        row.timestamp.format("%Y-%m-%d %H:%M UTC")
    );
    render_record(&row.record);
}

fn render_record(record: &SearchRecord) {
    let lines = [
        (
            "City",
            format!("{}, {}", record.city_name, record.country_code),
        ),
        ("Description", record.description.clone()),
        (
            "Lat/Lon",
            format!("{:.4}, {:.4}", record.coordinates.lat, record.coordinates.lon),
        ),
        ("Temperature (°C)", format!("{:.1}", record.temperature.current)),
        ("Feels like (°C)", format!("{:.1}", record.temperature.feels_like)),
        (
            "Min/Max temp (°C)",
            format!("{:.1}, {:.1}", record.temperature.min, record.temperature.max),
        ),
        ("Wind speed (m/s)", format!("{:.1}", record.wind_speed)),
        ("Local time", record.time.current.clone()),
        ("Sunrise", record.time.sunrise.clone()),
        ("Sunset", record.time.sunset.clone()),
        ("Map", map_link(record.coordinates)),
    ];

    println!();
    for (label, value) in lines {
        println!("  {label:<18} {value}");
    }
}

/// Most recent search first.
fn render_history(rows: &[SearchRow]) {
    println!();
    println!("Search history");

    if rows.is_empty() {
        println!("  (no searches recorded yet)");
        return;
    }

    for row in rows.iter().rev() {
        println!(
            "  #{:<4} {}  {:>6.1} °C  {}, {}  {}",
            row.id,
            row.timestamp.format("%Y-%m-%d %H:%M"),
            row.record.temperature.current,
            row.record.city_name,
            row.record.country_code,
            row.record.description
        );
    }
}

/// OpenStreetMap permalink centered on the observed coordinates.
fn map_link(coordinates: Coordinates) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat:.4}&mlon={lon:.4}#map=10/{lat:.4}/{lon:.4}",
        lat = coordinates.lat,
        lon = coordinates.lon
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_link_centers_on_the_coordinates() {
        let link = map_link(Coordinates { lat: 52.15, lon: 9.95 });

        assert_eq!(
            link,
            "https://www.openstreetmap.org/?mlat=52.1500&mlon=9.9500#map=10/52.1500/9.9500"
        );
    }
}
