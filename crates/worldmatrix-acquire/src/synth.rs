//! Deterministic fallback weather model.
//!
//! Used when neither the cache nor the remote API can supply conditions.
//! Everything here is a pure function of `(city_id, month, hour, units)`:
//! no clock reads, no randomness, no I/O, so the terminal tier can never
//! fail and tests can pin exact outputs.

use std::f64::consts::PI;

use worldmatrix_core::UnitSystem;

/// km/h to mph.
const KMH_TO_MPH: f64 = 0.621371;

const BASE_TEMPERATURE_DEFAULT: f64 = 15.0;

/// Conditions produced by the fallback model, in the requested units.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConditions {
    pub temperature: f64,
    pub condition: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

/// Synthesize plausible conditions for a city at a given local month and
/// hour.
pub fn synthesize(city_id: &str, month: u32, hour: u32, units: UnitSystem) -> SyntheticConditions {
    let celsius = round_tenths(base_temperature(city_id) + seasonal_offset(month) + diurnal_offset(hour));
    let wind_kmh = 3.5 + f64::from(month % 3);

    let (temperature, wind_speed) = match units {
        UnitSystem::Metric => (celsius, round_tenths(wind_kmh)),
        UnitSystem::Imperial => (
            round_tenths(celsius * 9.0 / 5.0 + 32.0),
            round_tenths(wind_kmh * KMH_TO_MPH),
        ),
    };

    SyntheticConditions {
        temperature,
        condition: condition_label(month, hour).to_string(),
        humidity: humidity_percent(month),
        wind_speed,
    }
}

/// Annual mean temperature per city, in Celsius.
fn base_temperature(city_id: &str) -> f64 {
    match city_id {
        "london" => 10.0,
        "tokyo" => 16.0,
        "newyork" => 12.0,
        _ => BASE_TEMPERATURE_DEFAULT,
    }
}

/// Sinusoidal annual cycle peaking mid-year, +-8 degrees C.
fn seasonal_offset(month: u32) -> f64 {
    8.0 * ((f64::from(month) - 1.0) * PI / 6.0).sin()
}

/// Sinusoidal daily cycle, +-3 degrees C around mid-day.
fn diurnal_offset(hour: u32) -> f64 {
    3.0 * ((f64::from(hour) - 12.0) * PI / 12.0).sin()
}

/// Fixed 4-step condition cycle keyed by month and hour.
fn condition_label(month: u32, hour: u32) -> &'static str {
    match (month + hour) % 4 {
        0 => "Clear",
        1 => "Partly Cloudy",
        2 => "Cloudy",
        _ => precipitation_label(month),
    }
}

/// The precipitation step of the cycle varies by season band.
fn precipitation_label(month: u32) -> &'static str {
    if matches!(month, 12 | 1 | 2) {
        "Light Snow"
    } else {
        "Light Rain"
    }
}

fn humidity_percent(month: u32) -> u8 {
    (65 + (month * 2) % 20) as u8
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_identical_inputs_identical_outputs() {
        for month in [1, 4, 7, 10] {
            for hour in [0, 6, 12, 18] {
                for units in [UnitSystem::Metric, UnitSystem::Imperial] {
                    let a = synthesize("london", month, hour, units);
                    let b = synthesize("london", month, hour, units);
                    assert_eq!(a, b, "month={month} hour={hour} units={units:?}");
                }
            }
        }
    }

    #[test]
    fn test_imperial_temperature_conversion() {
        for month in [1, 4, 7, 10] {
            for hour in [0, 6, 12, 18] {
                let metric = synthesize("tokyo", month, hour, UnitSystem::Metric);
                let imperial = synthesize("tokyo", month, hour, UnitSystem::Imperial);

                let expected = round_tenths(metric.temperature * 9.0 / 5.0 + 32.0);
                assert_eq!(imperial.temperature, expected);
            }
        }
    }

    #[test]
    fn test_imperial_wind_conversion() {
        let metric = synthesize("newyork", 5, 9, UnitSystem::Metric);
        let imperial = synthesize("newyork", 5, 9, UnitSystem::Imperial);

        let expected = round_tenths(metric.wind_speed * KMH_TO_MPH);
        assert_eq!(imperial.wind_speed, expected);
    }

    #[test]
    fn test_units_do_not_change_condition_or_humidity() {
        let metric = synthesize("london", 7, 15, UnitSystem::Metric);
        let imperial = synthesize("london", 7, 15, UnitSystem::Imperial);
        assert_eq!(metric.condition, imperial.condition);
        assert_eq!(metric.humidity, imperial.humidity);
    }

    #[test]
    fn test_temperature_model() {
        // January at mid-day: 10 + 8*sin(0) + 3*sin(0) = 10.0
        let january = synthesize("london", 1, 12, UnitSystem::Metric);
        assert_eq!(january.temperature, 10.0);

        // July (month 7): seasonal term is 8*sin(pi) = 0 again at mid-day.
        let july = synthesize("london", 7, 12, UnitSystem::Metric);
        assert_eq!(july.temperature, 10.0);

        // April (month 4): 10 + 8*sin(pi/2) = 18 at mid-day.
        let april = synthesize("london", 4, 12, UnitSystem::Metric);
        assert_eq!(april.temperature, 18.0);
    }

    #[test]
    fn test_diurnal_swing() {
        // 6am sits 3 degrees below mid-day, 6pm 3 above.
        let dawn = synthesize("london", 4, 6, UnitSystem::Metric);
        let noon = synthesize("london", 4, 12, UnitSystem::Metric);
        let dusk = synthesize("london", 4, 18, UnitSystem::Metric);

        assert_eq!(dawn.temperature, noon.temperature - 3.0);
        assert_eq!(dusk.temperature, noon.temperature + 3.0);
    }

    #[test]
    fn test_unknown_city_uses_default_base() {
        let record = synthesize("atlantis", 1, 12, UnitSystem::Metric);
        assert_eq!(record.temperature, 15.0);
    }

    #[test]
    fn test_condition_cycle_length_four() {
        // Walking (month + hour) through consecutive values repeats every 4.
        let labels: Vec<String> = (0..8)
            .map(|hour| synthesize("london", 4, hour, UnitSystem::Metric).condition)
            .collect();
        assert_eq!(labels[0], labels[4]);
        assert_eq!(labels[1], labels[5]);
        assert_eq!(labels[2], labels[6]);
        assert_eq!(labels[3], labels[7]);

        let distinct: std::collections::BTreeSet<&str> =
            labels.iter().map(String::as_str).collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn test_precipitation_label_by_season() {
        // (month + hour) % 4 == 3 selects the precipitation step.
        let winter = synthesize("london", 1, 2, UnitSystem::Metric);
        assert_eq!(winter.condition, "Light Snow");

        let summer = synthesize("london", 7, 0, UnitSystem::Metric);
        assert_eq!(summer.condition, "Light Rain");
    }

    #[test]
    fn test_humidity_and_wind_formulas() {
        let record = synthesize("london", 6, 12, UnitSystem::Metric);
        assert_eq!(record.humidity, 65 + (6 * 2) % 20);
        assert_eq!(record.wind_speed, 3.5); // 3.5 + 6 % 3 == 3.5

        let record = synthesize("london", 7, 12, UnitSystem::Metric);
        assert_eq!(record.humidity, 65 + (7 * 2) % 20);
        assert_eq!(record.wind_speed, 4.5); // 3.5 + 7 % 3 == 4.5
    }
}
