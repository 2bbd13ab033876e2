use aero_core::{
    AlertSeverity, GeocodingResult, Location, Status, UnitSystem, ViewState, WeatherSnapshot,
    format::icon_url,
};
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

pub fn print_state(state: &ViewState, units: UnitSystem, json: bool) -> Result<()> {
    if json {
        return print_json(state);
    }

    if let Some(banner) = &state.banner {
        println!("! {banner}\n");
    }

    match (&state.status, &state.snapshot) {
        (Status::Loaded, Some(snapshot)) => print!("{}", snapshot_text(snapshot, units)),
        _ => println!("Weather is unavailable."),
    }
    Ok(())
}

pub fn print_search_results(hits: &[GeocodingResult], json: bool) -> Result<()> {
    if json {
        return print_json(hits);
    }

    if hits.is_empty() {
        println!("No matching places.");
    }
    for hit in hits {
        println!("{:<40} {:>9.4} {:>10.4}", hit.display_name(), hit.lat, hit.lon);
    }
    Ok(())
}

pub fn print_locations(locations: &[Location], json: bool) -> Result<()> {
    if json {
        return print_json(locations);
    }

    if locations.is_empty() {
        println!("No saved locations.");
    }
    for loc in locations {
        println!("{:<28} {}", loc.id, loc.full_name);
    }
    Ok(())
}

fn severity_label(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Moderate => "moderate",
        AlertSeverity::Severe => "SEVERE",
        AlertSeverity::Extreme => "EXTREME",
    }
}

pub fn snapshot_text(s: &WeatherSnapshot, units: UnitSystem) -> String {
    let deg = units.symbol();
    let mut out = String::new();

    out.push_str(&format!("{}  ({})\n", s.location, s.description));
    out.push_str(&format!(
        "{}{deg}  H {}{deg}  L {}{deg}  feels like {}{deg}\n",
        s.current_temp, s.high_temp, s.low_temp, s.feels_like
    ));
    out.push_str(&format!(
        "Humidity {}%  Wind {} mph {}  Precipitation {}%\n",
        s.humidity, s.wind_speed, s.wind_direction, s.precipitation
    ));
    out.push_str(&format!("Sunrise {}  Sunset {}\n", s.sunrise, s.sunset));
    out.push_str(&format!("{}\n", icon_url(&s.icon, true)));

    if !s.hourly_forecast.is_empty() {
        out.push('\n');
        let row: Vec<String> = s
            .hourly_forecast
            .iter()
            .map(|h| format!("{} {}{deg}", h.time, h.temp))
            .collect();
        out.push_str(&row.join(" | "));
        out.push('\n');
    }

    if !s.daily_forecast.is_empty() {
        out.push('\n');
        for d in &s.daily_forecast {
            out.push_str(&format!(
                "{:<9} {:>4}{deg} / {:>4}{deg}  {:>3}%\n",
                d.day, d.high, d.low, d.precipitation
            ));
        }
    }

    for alert in s.alerts.iter().flatten() {
        out.push_str(&format!(
            "\n[{}] {} ({} - {})\n  {}\n",
            severity_label(alert.severity),
            alert.title,
            alert.start_time,
            alert.end_time,
            alert.description
        ));
    }

    out.push_str(&format!("\nUpdated {}\n", Local::now().format("%H:%M")));
    out
}
