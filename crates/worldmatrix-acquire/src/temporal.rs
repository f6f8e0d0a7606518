//! Three-tier resolution of current local time.

use std::sync::Arc;

use chrono::Utc;

use worldmatrix_store::{CacheStore, Provenance, TemporalRecord};

use crate::error::AcquireError;
use crate::registry::{CityProfile, CityRegistry};
use crate::time_client::TimeApiClient;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Resolves the current local time for a city: cache, then the remote
/// time API, then the local clock localized to the city's zone.
pub struct TemporalService {
    registry: Arc<CityRegistry>,
    store: Arc<CacheStore>,
    client: TimeApiClient,
    ttl_seconds: u64,
}

impl TemporalService {
    pub fn new(
        registry: Arc<CityRegistry>,
        store: Arc<CacheStore>,
        client: TimeApiClient,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            registry,
            store,
            client,
            ttl_seconds,
        }
    }

    /// Resolve the current local time for a city.
    ///
    /// Total for every id the registry knows: network and storage
    /// failures degrade through the tiers, and the local-clock tier
    /// cannot fail. Unknown ids are rejected before any I/O.
    pub async fn resolve(&self, city_id: &str) -> Result<TemporalRecord, AcquireError> {
        let profile = self
            .registry
            .get(city_id)
            .ok_or_else(|| AcquireError::UnknownCity(city_id.to_string()))?;

        match self.store.get_temporal(&profile.id, self.ttl_seconds) {
            Ok(Some(record)) => {
                tracing::debug!(city = %profile.id, "temporal cache hit");
                return Ok(record);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(city = %profile.id, error = %e, "temporal cache read failed, treating as miss");
            }
        }

        let record = match self.client.fetch_zone_time(profile.timezone.name()).await {
            Ok(instant) => TemporalRecord {
                city_id: profile.id.clone(),
                time_text: instant
                    .with_timezone(&profile.timezone)
                    .format(TIME_FORMAT)
                    .to_string(),
                captured_at: Utc::now().timestamp(),
                provenance: Provenance::Api,
            },
            Err(e) => {
                tracing::warn!(city = %profile.id, error = %e, "time API unavailable, using local clock");
                local_clock_record(profile)
            }
        };

        if let Err(e) = self.store.put_temporal(&record) {
            tracing::warn!(city = %profile.id, error = %e, "failed to persist temporal record");
        }
        Ok(record)
    }
}

/// Terminal tier: the current instant localized to the city's zone, no
/// network involved.
fn local_clock_record(profile: &CityProfile) -> TemporalRecord {
    let now = Utc::now();
    TemporalRecord {
        city_id: profile.id.clone(),
        time_text: now
            .with_timezone(&profile.timezone)
            .format(TIME_FORMAT)
            .to_string(),
        captured_at: now.timestamp(),
        provenance: Provenance::Fallback,
    }
}
