//! Canned data served when no API key is configured or the provider is down.

use crate::{
    format::temperature,
    model::{
        AlertSeverity, DailyPoint, GeocodingResult, HourlyPoint, UnitSystem, WeatherAlert,
        WeatherSnapshot,
    },
};

const CITIES: [(&str, f64, f64, &str); 5] = [
    ("San Francisco", 37.7749, -122.4194, "US"),
    ("New York", 40.7128, -74.0060, "US"),
    ("London", 51.5074, -0.1278, "GB"),
    ("Tokyo", 35.6762, 139.6503, "JP"),
    ("Sydney", -33.8688, 151.2093, "AU"),
];

/// Well-known cities whose name contains `query`, case-insensitively.
pub fn fallback_cities(query: &str) -> Vec<GeocodingResult> {
    let needle = query.trim().to_lowercase();

    CITIES
        .iter()
        .filter(|(name, ..)| name.to_lowercase().contains(&needle))
        .map(|&(name, lat, lon, country)| GeocodingResult {
            name: name.to_string(),
            lat,
            lon,
            country: country.to_string(),
            state: None,
        })
        .collect()
}

fn hour(time: &str, celsius: f64, icon: &str, units: UnitSystem) -> HourlyPoint {
    HourlyPoint { time: time.into(), temp: temperature(celsius, units), icon: icon.into() }
}

fn day(
    label: &str,
    high: f64,
    low: f64,
    icon: &str,
    precipitation: u8,
    units: UnitSystem,
) -> DailyPoint {
    DailyPoint {
        day: label.into(),
        high: temperature(high, units),
        low: temperature(low, units),
        icon: icon.into(),
        precipitation,
    }
}

/// San Francisco on a clear day. Temperatures are stored in Celsius and
/// converted to `units`; wind stays in mph like live data.
pub fn mock_snapshot(units: UnitSystem) -> WeatherSnapshot {
    WeatherSnapshot {
        location: "San Francisco".into(),
        description: "Clear sky".into(),
        current_temp: temperature(22.0, units),
        high_temp: temperature(25.0, units),
        low_temp: temperature(18.0, units),
        feels_like: temperature(23.0, units),
        humidity: 65,
        wind_speed: 8,
        wind_direction: "NW".into(),
        precipitation: 10,
        sunrise: "6:15 AM".into(),
        sunset: "8:30 PM".into(),
        icon: "01d".into(),
        hourly_forecast: vec![
            hour("Now", 22.0, "01d", units),
            hour("12:00", 23.0, "01d", units),
            hour("15:00", 25.0, "01d", units),
            hour("18:00", 24.0, "02d", units),
            hour("21:00", 21.0, "02n", units),
            hour("00:00", 19.0, "01n", units),
            hour("03:00", 18.0, "01n", units),
            hour("06:00", 18.0, "01d", units),
        ],
        daily_forecast: vec![
            day("Today", 25.0, 18.0, "01d", 10, units),
            day("Tomorrow", 26.0, 19.0, "01d", 0, units),
            day("Thu", 27.0, 19.0, "02d", 0, units),
            day("Fri", 24.0, 18.0, "10d", 30, units),
            day("Sat", 22.0, 17.0, "10d", 60, units),
        ],
        alerts: Some(vec![
            WeatherAlert {
                title: "Excessive Heat Warning".into(),
                description: "The National Weather Service has issued an excessive heat warning. \
                              High temperatures may cause heat-related illnesses."
                    .into(),
                severity: AlertSeverity::Severe,
                start_time: "12:00 PM".into(),
                end_time: "8:00 PM".into(),
            },
            WeatherAlert {
                title: "Air Quality Alert".into(),
                description: "Air quality may be unhealthy for sensitive groups. Reduce prolonged \
                              outdoor activities if you experience respiratory symptoms."
                    .into(),
                severity: AlertSeverity::Moderate,
                start_time: "6:00 AM".into(),
                end_time: "6:00 PM".into(),
            },
        ]),
    }
}
