//! Terminal rendering of resolved city reports.

use chrono::Utc;
use serde_json::json;

use worldmatrix_acquire::CityProfile;
use worldmatrix_core::UnitSystem;
use worldmatrix_store::{AtmosphericRecord, Provenance, TemporalRecord};

/// Resolved data for one city, ready to render.
pub struct CityReport {
    pub profile: CityProfile,
    pub temporal: TemporalRecord,
    pub atmospheric: AtmosphericRecord,
}

const CARD_INNER_WIDTH: usize = 40;

pub fn provenance_symbol(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::Cache => "⚡",
        Provenance::Api => "📡",
        Provenance::Fallback => "🔄",
    }
}

pub fn temperature_unit(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "°C",
        UnitSystem::Imperial => "°F",
    }
}

pub fn wind_unit(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "km/h",
        UnitSystem::Imperial => "mph",
    }
}

/// Clock-and-zone portion of a temporal record's text
/// ("2024-02-01 10:30:00 GMT" -> "10:30:00 GMT").
fn time_short(time_text: &str) -> &str {
    match time_text.split_once(' ') {
        Some((_, rest)) => rest,
        None => time_text,
    }
}

fn pad(content: &str, width: usize) -> String {
    let len = content.chars().count();
    if len >= width {
        content.chars().take(width).collect()
    } else {
        format!("{}{}", content, " ".repeat(width - len))
    }
}

/// Render one city as a boxed card.
pub fn render_card(report: &CityReport, units: UnitSystem) -> String {
    let border = "═".repeat(CARD_INNER_WIDTH + 2);
    let row = |content: &str| format!("║ {} ║", pad(content, CARD_INNER_WIDTH));

    let weather = format!(
        "Weather: {:.1}{} | {}",
        report.atmospheric.temperature,
        temperature_unit(units),
        report.atmospheric.condition
    );
    let source = format!(
        "Source:  {} {}",
        provenance_symbol(report.temporal.provenance),
        report.temporal.provenance.as_str()
    );

    let mut lines = Vec::new();
    lines.push(format!("╔{border}╗"));
    lines.push(row(&report.profile.display_name));
    lines.push(format!("╠{border}╣"));
    lines.push(row(&format!("Time:    {}", report.temporal.time_text)));
    lines.push(row(&weather));
    lines.push(row(&format!(
        "         Humidity: {}%",
        report.atmospheric.humidity
    )));
    lines.push(row(&format!(
        "         Wind: {:.1} {}",
        report.atmospheric.wind_speed,
        wind_unit(units)
    )));
    lines.push(row(&format!("Zone:    {}", report.profile.timezone.name())));
    lines.push(row(&source));
    lines.push(format!("╚{border}╝"));
    lines.join("\n")
}

/// Render all cities as one aligned comparison table.
pub fn render_comparison(reports: &[CityReport], units: UnitSystem) -> String {
    let headers = ["City", "Time", "Temp", "Condition", "Humidity", "Wind", "Source"];

    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|report| {
            let condition: String = report.atmospheric.condition.chars().take(12).collect();
            vec![
                report.profile.display_name.clone(),
                time_short(&report.temporal.time_text).to_string(),
                format!("{:.1}{}", report.atmospheric.temperature, temperature_unit(units)),
                condition,
                format!("{}%", report.atmospheric.humidity),
                format!("{:.1} {}", report.atmospheric.wind_speed, wind_unit(units)),
                report.temporal.provenance.as_str().to_string(),
            ]
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let make_row = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {} ", pad(cell, *width)))
            .collect();
        format!("│{}│", padded.join("│"))
    };
    let make_border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

    let mut lines = Vec::new();
    lines.push(make_border("┌", "┬", "┐"));
    lines.push(make_row(&header_cells));
    lines.push(make_border("├", "┼", "┤"));
    for row in &rows {
        lines.push(make_row(row));
    }
    lines.push(make_border("└", "┴", "┘"));
    lines.join("\n")
}

/// Compact JSON envelope for `--raw`.
pub fn render_raw(reports: &[CityReport], units: UnitSystem) -> String {
    let mut data = serde_json::Map::new();
    for report in reports {
        data.insert(
            report.profile.id.clone(),
            json!({
                "display_name": report.profile.display_name,
                "time": {
                    "value": report.temporal.time_text,
                    "source": report.temporal.provenance,
                    "captured_at": report.temporal.captured_at,
                },
                "weather": {
                    "temperature": report.atmospheric.temperature,
                    "condition": report.atmospheric.condition,
                    "humidity": report.atmospheric.humidity,
                    "wind_speed": report.atmospheric.wind_speed,
                    "source": report.atmospheric.provenance,
                    "captured_at": report.atmospheric.captured_at,
                },
                "coordinates": [report.profile.latitude, report.profile.longitude],
                "timezone": report.profile.timezone.name(),
            }),
        );
    }

    json!({
        "timestamp": Utc::now().to_rfc3339(),
        "system": "worldmatrix",
        "units": units.as_str(),
        "data": data,
    })
    .to_string()
}
