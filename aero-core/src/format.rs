//! Unit conversion and label formatting shared by the provider and the CLI.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

use crate::model::UnitSystem;

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const MPS_TO_MPH: f64 = 2.237;

pub fn round_temperature(temp: f64) -> i32 {
    temp.round() as i32
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Rounded temperature in `units`, from a Celsius reading.
pub fn temperature(celsius: f64, units: UnitSystem) -> i32 {
    match units {
        UnitSystem::Metric => round_temperature(celsius),
        UnitSystem::Imperial => round_temperature(celsius_to_fahrenheit(celsius)),
    }
}

/// Wind is always shown in mph, independent of the temperature unit.
pub fn mps_to_mph(speed: f64) -> u32 {
    (speed.max(0.0) * MPS_TO_MPH).round() as u32
}

/// Buckets degrees into 8 compass points; 360 wraps back to "N".
pub fn wind_direction(degrees: f64) -> &'static str {
    let idx = (degrees / 45.0).round().rem_euclid(8.0) as usize;
    COMPASS[idx % COMPASS.len()]
}

/// 0–1 probability to a whole percentage.
pub fn probability_percent(pop: f64) -> u8 {
    (pop.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn local_time(ts: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

/// "6:15 AM"
pub fn format_clock(ts: i64, offset: FixedOffset) -> String {
    local_time(ts, offset).format("%-I:%M %p").to_string()
}

/// "15:00", hour unpadded.
pub fn format_hour(ts: i64, offset: FixedOffset) -> String {
    local_time(ts, offset).format("%-H:00").to_string()
}

/// "Today", "Tomorrow" or a short weekday name.
pub fn format_day(ts: i64, offset: FixedOffset, today: NaiveDate) -> String {
    let date = local_time(ts, offset).date_naive();

    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.weekday().to_string()
    }
}

pub fn icon_url(icon: &str, large: bool) -> String {
    let suffix = if large { "@2x" } else { "" };
    format!("https://openweathermap.org/img/wn/{icon}{suffix}.png")
}
