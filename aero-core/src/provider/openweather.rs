use std::{collections::BTreeMap, time::Duration};

use chrono::{FixedOffset, Local, NaiveDate, Offset, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{ProviderError, truncate_body},
    format::{
        format_clock, format_day, format_hour, local_time, mps_to_mph, probability_percent,
        temperature, wind_direction,
    },
    model::{
        AlertSeverity, DailyPoint, GeocodingResult, HourlyPoint, UnitSystem, WeatherAlert,
        WeatherSnapshot,
    },
};

const GEOCODE_LIMIT: usize = 5;
const HOURLY_POINTS: usize = 8;
const DAILY_POINTS: usize = 5;

/// Thin HTTP client for the OpenWeatherMap geocoding, current and forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherApi {
    api_key: String,
    base_url: String,
    geo_base_url: String,
    http: Client,
}

impl OpenWeatherApi {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        geo_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: trim_slash(base_url.into()),
            geo_base_url: trim_slash(geo_base_url.into()),
            http,
        })
    }

    pub async fn geocode(&self, query: &str) -> Result<Vec<GeocodingResult>, ProviderError> {
        let url = format!("{}/direct", self.geo_base_url);
        let limit = GEOCODE_LIMIT.to_string();

        let mut hits: Vec<GeocodingResult> = self
            .get_json(&url, &[("q", query), ("limit", limit.as_str())])
            .await?;
        hits.truncate(GEOCODE_LIMIT);
        Ok(hits)
    }

    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentPayload, ProviderError> {
        let url = format!("{}/weather", self.base_url);
        let (lat, lon) = (lat.to_string(), lon.to_string());
        self.get_json(&url, &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", "metric")])
            .await
    }

    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, ProviderError> {
        let url = format!("{}/forecast", self.base_url);
        let (lat, lon) = (lat.to_string(), lon.to_string());
        self.get_json(&url, &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", "metric")])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        debug!(url, ?query, "OpenWeather request");

        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwWind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwSys {
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// `/weather` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPayload {
    #[serde(default)]
    pub name: String,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub wind: OwWind,
    #[serde(default)]
    pub sys: OwSys,
    /// Shift in seconds from UTC for the location.
    #[serde(default)]
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPoint {
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub pop: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwAlert {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: i64,
    pub end: i64,
}

/// `/forecast` response body: 3-hour points plus optional alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastPoint>,
    #[serde(default)]
    pub alerts: Option<Vec<OwAlert>>,
}

/// Time zone, calendar day and unit system used while normalizing.
#[derive(Debug, Clone, Copy)]
pub struct Normalization {
    pub units: UnitSystem,
    pub offset: FixedOffset,
    pub today: NaiveDate,
}

impl Normalization {
    /// Uses the location's own UTC shift when the provider reports one,
    /// otherwise this machine's offset.
    pub fn for_current(units: UnitSystem, current: &CurrentPayload) -> Self {
        let offset = current
            .timezone
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Local::now().offset().fix());
        let today = local_time(Utc::now().timestamp(), offset).date_naive();

        Self { units, offset, today }
    }

    fn temp(&self, celsius: f64) -> i32 {
        temperature(celsius, self.units)
    }
}

fn primary(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.description.clone(), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

struct DayAccumulator {
    first_dt: i64,
    temp_min: f64,
    temp_max: f64,
    pop: f64,
    icon: String,
}

/// Builds one snapshot from current conditions and, when available, the forecast.
/// Without a forecast the hourly and daily series hold a single point each.
pub fn build_snapshot(
    current: &CurrentPayload,
    forecast: Option<&ForecastPayload>,
    norm: &Normalization,
) -> WeatherSnapshot {
    let (description, icon) = primary(&current.weather);

    let (hourly_forecast, daily_forecast, precipitation, alerts) = match forecast {
        Some(forecast) if !forecast.list.is_empty() => (
            hourly_points(&forecast.list, norm),
            daily_points(&forecast.list, norm),
            forecast.list.first().map_or(0, |p| probability_percent(p.pop)),
            forecast.alerts.as_deref().map(|alerts| weather_alerts(alerts, norm)),
        ),
        _ => (
            vec![HourlyPoint {
                time: "Now".to_string(),
                temp: norm.temp(current.main.temp),
                icon: icon.clone(),
            }],
            vec![DailyPoint {
                day: "Today".to_string(),
                high: norm.temp(current.main.temp_max),
                low: norm.temp(current.main.temp_min),
                icon: icon.clone(),
                precipitation: 0,
            }],
            0,
            None,
        ),
    };

    WeatherSnapshot {
        location: current.name.clone(),
        description,
        current_temp: norm.temp(current.main.temp),
        high_temp: norm.temp(current.main.temp_max),
        low_temp: norm.temp(current.main.temp_min),
        feels_like: norm.temp(current.main.feels_like),
        humidity: current.main.humidity,
        wind_speed: mps_to_mph(current.wind.speed),
        wind_direction: wind_direction(current.wind.deg).to_string(),
        precipitation,
        sunrise: format_clock(current.sys.sunrise, norm.offset),
        sunset: format_clock(current.sys.sunset, norm.offset),
        icon,
        hourly_forecast,
        daily_forecast,
        alerts,
    }
}

fn hourly_points(list: &[ForecastPoint], norm: &Normalization) -> Vec<HourlyPoint> {
    list.iter()
        .take(HOURLY_POINTS)
        .enumerate()
        .map(|(i, point)| HourlyPoint {
            time: if i == 0 { "Now".to_string() } else { format_hour(point.dt, norm.offset) },
            temp: norm.temp(point.main.temp),
            icon: primary(&point.weather).1,
        })
        .collect()
}

/// Groups points by local calendar date: lowest minimum, highest maximum,
/// highest precipitation chance, icon of the first point seen that day.
pub fn daily_points(list: &[ForecastPoint], norm: &Normalization) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for point in list {
        let date = local_time(point.dt, norm.offset).date_naive();
        days.entry(date)
            .and_modify(|day| {
                day.temp_min = day.temp_min.min(point.main.temp_min);
                day.temp_max = day.temp_max.max(point.main.temp_max);
                day.pop = day.pop.max(point.pop);
            })
            .or_insert_with(|| DayAccumulator {
                first_dt: point.dt,
                temp_min: point.main.temp_min,
                temp_max: point.main.temp_max,
                pop: point.pop,
                icon: primary(&point.weather).1,
            });
    }

    days.into_values()
        .take(DAILY_POINTS)
        .map(|day| DailyPoint {
            day: format_day(day.first_dt, norm.offset, norm.today),
            high: norm.temp(day.temp_max),
            low: norm.temp(day.temp_min),
            icon: day.icon,
            precipitation: probability_percent(day.pop),
        })
        .collect()
}

fn weather_alerts(alerts: &[OwAlert], norm: &Normalization) -> Vec<WeatherAlert> {
    alerts
        .iter()
        .map(|alert| {
            let title = alert
                .event
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Weather Alert".to_string());

            WeatherAlert {
                severity: AlertSeverity::classify(&title),
                title,
                description: alert.description.clone().unwrap_or_default(),
                start_time: format_clock(alert.start, norm.offset),
                end_time: format_clock(alert.end, norm.offset),
            }
        })
        .collect()
}
