//! Acquisition error types.

use thiserror::Error;

/// Contract-level acquisition errors.
///
/// Network and storage degradation never surface here; they are absorbed
/// by the tier fall-through inside the services. The only way `resolve`
/// fails is being asked about a city the registry does not know.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("unknown city id: {0}")]
    UnknownCity(String),
}

/// Remote time API failures. Every variant means "tier unavailable" to
/// the caller.
#[derive(Debug, Error)]
pub enum TimeApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Parse(String),
}

/// Remote weather API failures. Every variant means "tier unavailable" to
/// the caller.
#[derive(Debug, Error)]
pub enum WeatherApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("missing field in payload: {0}")]
    MissingField(&'static str),
}
