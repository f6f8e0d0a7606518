//! SQLite-backed cache for temporal and atmospheric records.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

use crate::types::{AtmosphericRecord, Provenance, TemporalRecord};

/// Storage-tier errors.
///
/// Callers treat read failures as a cache miss and write failures as
/// non-fatal; only [`CacheStore::open`] failures are fatal (startup).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create cache directory: {0}")]
    CreateDir(#[from] std::io::Error),

    #[error("failed to open cache database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("cache query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// TTL-qualified key/value store for the two record kinds.
///
/// At most one row exists per `(city_id, record kind)`; every put is a
/// whole-row replacement. The connection is behind a mutex so the store
/// can be shared across concurrent per-city resolutions.
pub struct CacheStore {
    conn: Mutex<Connection>,
}

impl CacheStore {
    /// Open or create the cache database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(StoreError::Open)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS temporal_records (
                city_id TEXT PRIMARY KEY,
                time_text TEXT NOT NULL,
                captured_at INTEGER NOT NULL,
                provenance TEXT NOT NULL,
                fingerprint TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS atmospheric_records (
                city_id TEXT PRIMARY KEY,
                temperature REAL NOT NULL,
                condition TEXT NOT NULL,
                humidity INTEGER NOT NULL,
                wind_speed REAL NOT NULL,
                captured_at INTEGER NOT NULL,
                provenance TEXT NOT NULL,
                fingerprint TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Get the temporal record for a city if it is still fresh.
    ///
    /// Freshness is `now - captured_at <= ttl_seconds`, with "now" taken
    /// at call time. A stale row is left in place and simply not
    /// returned.
    pub fn get_temporal(
        &self,
        city_id: &str,
        ttl_seconds: u64,
    ) -> Result<Option<TemporalRecord>, StoreError> {
        let cutoff = Utc::now().timestamp() - ttl_seconds as i64;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT city_id, time_text, captured_at, provenance
             FROM temporal_records
             WHERE city_id = ?1 AND captured_at >= ?2",
        )?;

        let mut rows = stmt.query(params![city_id, cutoff])?;
        if let Some(row) = rows.next()? {
            let provenance: String = row.get(3)?;
            Ok(Some(TemporalRecord {
                city_id: row.get(0)?,
                time_text: row.get(1)?,
                captured_at: row.get(2)?,
                provenance: Provenance::parse(&provenance),
            }))
        } else {
            Ok(None)
        }
    }

    /// Upsert the temporal record for its city.
    pub fn put_temporal(&self, record: &TemporalRecord) -> Result<(), StoreError> {
        let fingerprint = temporal_fingerprint(record);
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO temporal_records
             (city_id, time_text, captured_at, provenance, fingerprint)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.city_id,
                record.time_text,
                record.captured_at,
                record.provenance.as_str(),
                fingerprint,
            ],
        )?;
        Ok(())
    }

    /// Get the atmospheric record for a city if it is still fresh.
    pub fn get_atmospheric(
        &self,
        city_id: &str,
        ttl_seconds: u64,
    ) -> Result<Option<AtmosphericRecord>, StoreError> {
        let cutoff = Utc::now().timestamp() - ttl_seconds as i64;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT city_id, temperature, condition, humidity, wind_speed, captured_at, provenance
             FROM atmospheric_records
             WHERE city_id = ?1 AND captured_at >= ?2",
        )?;

        let mut rows = stmt.query(params![city_id, cutoff])?;
        if let Some(row) = rows.next()? {
            let humidity: i64 = row.get(3)?;
            let provenance: String = row.get(6)?;
            Ok(Some(AtmosphericRecord {
                city_id: row.get(0)?,
                temperature: row.get(1)?,
                condition: row.get(2)?,
                humidity: humidity.clamp(0, 100) as u8,
                wind_speed: row.get(4)?,
                captured_at: row.get(5)?,
                provenance: Provenance::parse(&provenance),
            }))
        } else {
            Ok(None)
        }
    }

    /// Upsert the atmospheric record for its city.
    pub fn put_atmospheric(&self, record: &AtmosphericRecord) -> Result<(), StoreError> {
        let fingerprint = atmospheric_fingerprint(record);
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO atmospheric_records
             (city_id, temperature, condition, humidity, wind_speed, captured_at, provenance, fingerprint)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.city_id,
                record.temperature,
                record.condition,
                record.humidity as i64,
                record.wind_speed,
                record.captured_at,
                record.provenance.as_str(),
                fingerprint,
            ],
        )?;
        Ok(())
    }

    /// Delete all rows of both kinds.
    pub fn purge(&self) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute_batch("DELETE FROM temporal_records; DELETE FROM atmospheric_records;")?;
        Ok(())
    }
}

/// Content fingerprint of a temporal record.
///
/// A pure function of the content fields, stored for integrity
/// bookkeeping on every put and never consulted on read.
pub fn temporal_fingerprint(record: &TemporalRecord) -> String {
    let payload = format!(
        "{}|{}|{}",
        record.city_id, record.time_text, record.captured_at
    );
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// Content fingerprint of an atmospheric record.
pub fn atmospheric_fingerprint(record: &AtmosphericRecord) -> String {
    let payload = format!(
        "{}|{}|{}|{}|{}|{}",
        record.city_id,
        record.temperature,
        record.condition,
        record.humidity,
        record.wind_speed,
        record.captured_at
    );
    hex::encode(Sha256::digest(payload.as_bytes()))
}
