//! Durable search history over SQLite, with an in-memory mirror.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;

use crate::model::{Coordinates, LocalTimes, SearchRecord, SearchRow, TemperatureSummary};

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS search_result (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    cityname TEXT,
    country_code TEXT,
    lat REAL,
    lon REAL,
    description TEXT,
    temperature REAL,
    feels_like REAL,
    min_temp REAL,
    max_temp REAL,
    wind_speed REAL,
    local_time TEXT,
    sunrise TEXT,
    sunset TEXT
)
";

const SELECT_ALL: &str = "
SELECT id, timestamp, cityname, country_code, lat, lon, description,
       temperature, feels_like, min_temp, max_temp, wind_speed,
       local_time, sunrise, sunset
FROM search_result
ORDER BY id ASC
";

const INSERT: &str = "
INSERT INTO search_result (
    timestamp, cityname, country_code, lat, lon, description,
    temperature, feels_like, min_temp, max_temp, wind_speed,
    local_time, sunrise, sunset
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file or the `search_result` table is not usable.
    #[error("search history unavailable: {0}")]
    Unavailable(String),

    #[error("search history query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// The record failed the all-or-nothing append validation.
    #[error("record is missing required fields: {0}")]
    IncompleteRecord(String),
}

/// Search history store: one SQLite table plus an in-memory mirror.
///
/// The mirror matches the table contents up to the last successful append,
/// in ascending id order. `load` rebuilds it wholesale.
#[derive(Debug)]
pub struct SearchStore {
    conn: Connection,
    mirror: Vec<SearchRow>,
}

impl SearchStore {
    /// Open the database at `path` and load the full history.
    ///
    /// The table must already exist; see [`init_database`]. A file that
    /// cannot be opened or a missing table reports `Unavailable`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;

        let mut store = Self {
            conn,
            mirror: Vec::new(),
        };
        store.load()?;

        Ok(store)
    }

    /// Open an in-memory store, creating the table. Used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.execute_batch(CREATE_TABLE)?;

        Ok(Self {
            conn,
            mirror: Vec::new(),
        })
    }

    /// Rebuild the mirror from the table, ascending id order.
    pub fn load(&mut self) -> Result<&[SearchRow], StoreError> {
        let mut stmt = self
            .conn
            .prepare(SELECT_ALL)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let rows = stmt
            .query_map([], row_from_sql)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        self.mirror = rows;
        Ok(&self.mirror)
    }

    /// All-or-nothing append: validate, write one row durably, then push the
    /// identical row onto the mirror. The store assigns id and timestamp;
    /// every record field passes through unchanged.
    pub fn append(&mut self, record: &SearchRecord) -> Result<SearchRow, StoreError> {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::IncompleteRecord(missing.join(", ")));
        }

        let timestamp = Utc::now();
        self.conn.execute(
            INSERT,
            params![
                timestamp.to_rfc3339(),
                record.city_name,
                record.country_code,
                record.coordinates.lat,
                record.coordinates.lon,
                record.description,
                record.temperature.current,
                record.temperature.feels_like,
                record.temperature.min,
                record.temperature.max,
                record.wind_speed,
                record.time.current,
                record.time.sunrise,
                record.time.sunset,
            ],
        )?;

        let row = SearchRow {
            id: self.conn.last_insert_rowid(),
            timestamp,
            record: record.clone(),
        };
        self.mirror.push(row.clone());

        Ok(row)
    }

    /// Row with the highest id, if any.
    pub fn most_recent(&self) -> Option<&SearchRow> {
        self.mirror.last()
    }

    /// Full history in insertion order, most recent last. Callers wanting
    /// reverse-chronological display reverse it themselves.
    pub fn all(&self) -> &[SearchRow] {
        &self.mirror
    }
}

fn row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchRow> {
    let timestamp: String = row.get(1)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default();

    Ok(SearchRow {
        id: row.get(0)?,
        timestamp,
        record: SearchRecord {
            city_name: row.get(2)?,
            country_code: row.get(3)?,
            coordinates: Coordinates {
                lat: row.get(4)?,
                lon: row.get(5)?,
            },
            description: row.get(6)?,
            temperature: TemperatureSummary {
                current: row.get(7)?,
                feels_like: row.get(8)?,
                min: row.get(9)?,
                max: row.get(10)?,
            },
            wind_speed: row.get(11)?,
            time: LocalTimes {
                current: row.get(12)?,
                sunrise: row.get(13)?,
                sunset: row.get(14)?,
            },
        },
    })
}

/// Create the database file and `search_result` table if absent. With
/// `force`, delete the existing file first and start from scratch.
pub fn init_database(path: impl AsRef<Path>, force: bool) -> Result<(), StoreError> {
    let path = path.as_ref();

    if force && path.exists() {
        fs::remove_file(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "removed existing search history database");
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
    }

    let conn = Connection::open(path)
        .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
    conn.execute_batch(CREATE_TABLE)?;

    Ok(())
}
