//! Static table of supported cities.

use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Profile for one supported city. Immutable at run time.
#[derive(Debug, Clone)]
pub struct CityProfile {
    /// Short stable key; the canonical cache key for both record kinds.
    pub id: String,
    pub timezone: Tz,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Remote weather provider's own identifier for this city. When
    /// absent the weather request falls back to coordinates.
    pub weather_provider_id: Option<String>,
}

/// Read-only lookup table of supported cities.
///
/// Injected into the acquisition services rather than consulted as global
/// state, so tests can run against synthetic city sets.
#[derive(Debug, Clone, Default)]
pub struct CityRegistry {
    cities: BTreeMap<String, CityProfile>,
}

impl CityRegistry {
    /// The built-in city set.
    pub fn builtin() -> Self {
        Self::from_profiles([
            CityProfile {
                id: "london".to_string(),
                timezone: chrono_tz::Europe::London,
                display_name: "London".to_string(),
                latitude: 51.5074,
                longitude: -0.1278,
                weather_provider_id: Some("2643743".to_string()),
            },
            CityProfile {
                id: "tokyo".to_string(),
                timezone: chrono_tz::Asia::Tokyo,
                display_name: "Tokyo".to_string(),
                latitude: 35.6762,
                longitude: 139.6503,
                weather_provider_id: Some("1850147".to_string()),
            },
            CityProfile {
                id: "newyork".to_string(),
                timezone: chrono_tz::America::New_York,
                display_name: "New York".to_string(),
                latitude: 40.7128,
                longitude: -74.0060,
                weather_provider_id: Some("5128581".to_string()),
            },
        ])
    }

    /// Build a registry from an arbitrary set of profiles.
    pub fn from_profiles(profiles: impl IntoIterator<Item = CityProfile>) -> Self {
        Self {
            cities: profiles
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CityProfile> {
        self.cities.get(id)
    }

    /// City ids in stable (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cities.keys().map(String::as_str)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &CityProfile> {
        self.cities.values()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
