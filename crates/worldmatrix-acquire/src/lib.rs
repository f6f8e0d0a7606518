//! Acquisition services for worldmatrix.
//!
//! Each record kind resolves through three tiers: persisted cache, remote
//! API, deterministic local fallback. The registry of supported cities and
//! the configuration are injected at construction time.

pub mod atmospheric;
pub mod error;
pub mod registry;
pub mod synth;
pub mod temporal;
pub mod time_client;
pub mod weather_client;

pub use atmospheric::AtmosphericService;
pub use error::{AcquireError, TimeApiError, WeatherApiError};
pub use registry::{CityProfile, CityRegistry};
pub use temporal::TemporalService;
pub use time_client::TimeApiClient;
pub use weather_client::{WeatherApiClient, WeatherObservation};
