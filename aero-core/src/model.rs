use serde::{Deserialize, Serialize};

/// A place the user has chosen, persisted in the saved-locations list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        country: impl Into<String>,
        state: Option<String>,
    ) -> Self {
        let name = name.into();
        let country = country.into();
        let full_name = display_name(&name, state.as_deref(), &country);

        Self { id: location_id(lat, lon), name, full_name, lat, lon, country, state }
    }
}

/// Saved-location ids combine both coordinates.
pub fn location_id(lat: f64, lon: f64) -> String {
    format!("{lat}_{lon}")
}

fn display_name(name: &str, state: Option<&str>, country: &str) -> String {
    let mut out = name.to_string();
    if let Some(state) = state.filter(|s| !s.is_empty()) {
        out.push_str(", ");
        out.push_str(state);
    }
    if !country.is_empty() {
        out.push_str(", ");
        out.push_str(country);
    }
    out
}

/// A single geocoding hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl GeocodingResult {
    /// "Springfield, Illinois, US"
    pub fn display_name(&self) -> String {
        display_name(&self.name, self.state.as_deref(), &self.country)
    }

    pub fn into_location(self) -> Location {
        Location::new(self.name, self.lat, self.lon, self.country, self.state)
    }
}

/// A geolocation reading.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFix {
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Temperature unit system used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Moderate,
    Severe,
    Extreme,
}

impl AlertSeverity {
    /// Keyword heuristic over the provider's event name. Not authoritative:
    /// the provider does not ship a severity field.
    pub fn classify(event: &str) -> Self {
        let event = event.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| event.contains(w));

        if has(&["extreme", "hurricane", "tornado"]) {
            AlertSeverity::Extreme
        } else if has(&["severe", "storm", "warning"]) {
            AlertSeverity::Severe
        } else {
            AlertSeverity::Moderate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlert {
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temp: i32,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub day: String,
    pub high: i32,
    pub low: i32,
    pub icon: String,
    pub precipitation: u8,
}

/// Normalized, display-ready weather for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub location: String,
    pub description: String,
    pub current_temp: i32,
    pub high_temp: i32,
    pub low_temp: i32,
    pub feels_like: i32,
    pub humidity: u8,
    /// Always miles per hour, whatever the temperature unit.
    pub wind_speed: u32,
    pub wind_direction: String,
    pub precipitation: u8,
    pub sunrise: String,
    pub sunset: String,
    pub icon: String,
    pub hourly_forecast: Vec<HourlyPoint>,
    pub daily_forecast: Vec<DailyPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<WeatherAlert>>,
}
