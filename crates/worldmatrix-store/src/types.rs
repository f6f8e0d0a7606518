use serde::{Deserialize, Serialize};

/// Where a record's values came from.
///
/// Preserved verbatim across cache hits: a record acquired from the
/// network keeps `Api` provenance no matter how many times it is later
/// served from the cache. The `Cache` variant exists for presentation
/// layers; the acquisition services never assign it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Api,
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Api => "api",
            Self::Fallback => "fallback",
        }
    }

    /// Parse a stored provenance column. Unrecognized values read as
    /// `Cache`, the least-authoritative tag.
    pub fn parse(value: &str) -> Self {
        match value {
            "api" => Self::Api,
            "fallback" => Self::Fallback,
            _ => Self::Cache,
        }
    }
}

/// Current local-time reading for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalRecord {
    pub city_id: String,
    /// Localized, human-readable timestamp including the zone abbreviation.
    pub time_text: String,
    /// Unix seconds at acquisition time.
    pub captured_at: i64,
    pub provenance: Provenance,
}

/// Current weather reading for one city.
///
/// Temperature and wind speed follow the unit system that was active when
/// the record was acquired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericRecord {
    pub city_id: String,
    pub temperature: f64,
    pub condition: String,
    /// Relative humidity, 0-100.
    pub humidity: u8,
    pub wind_speed: f64,
    /// Unix seconds at acquisition time.
    pub captured_at: i64,
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_round_trip() {
        for p in [Provenance::Cache, Provenance::Api, Provenance::Fallback] {
            assert_eq!(Provenance::parse(p.as_str()), p);
        }
    }

    #[test]
    fn test_provenance_unknown_reads_as_cache() {
        assert_eq!(Provenance::parse("garbage"), Provenance::Cache);
    }

    #[test]
    fn test_provenance_serializes_lowercase() {
        let json = serde_json::to_string(&Provenance::Fallback);
        assert!(json.is_ok_and(|j| j == "\"fallback\""));
    }
}
