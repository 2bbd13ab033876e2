use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, info, warn};

use crate::{
    Config,
    error::ProviderError,
    model::{GeocodingResult, UnitSystem, WeatherSnapshot},
    provider::openweather::{Normalization, OpenWeatherApi, build_snapshot},
};

pub mod mock;
pub mod openweather;

/// Queries shorter than this never reach the provider.
pub const MIN_QUERY_LEN: usize = 2;

/// What the screen controller needs from a weather source.
///
/// Both operations degrade instead of failing: search yields an empty list,
/// and `fetch_weather` only yields `None` when the provider answered with
/// something that cannot be read at all.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn search_locations(&self, query: &str) -> Vec<GeocodingResult>;

    async fn fetch_weather(&self, lat: f64, lon: f64) -> Option<WeatherSnapshot>;

    /// `false` when answers come from canned data, whose place names say
    /// nothing about the requested coordinates.
    fn is_configured(&self) -> bool {
        true
    }
}

/// OpenWeatherMap client carrying the single fallback policy: mock data when
/// unconfigured or unreachable, current-only snapshots when the forecast fails.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api: Option<OpenWeatherApi>,
    units: UnitSystem,
}

impl WeatherClient {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let api = match config.effective_api_key() {
            Some(key) => Some(OpenWeatherApi::new(
                key,
                config.base_url.as_str(),
                config.geo_base_url.as_str(),
                config.timeout(),
            )?),
            None => None,
        };

        Ok(Self { api, units: config.units })
    }

    /// A client that never touches the network.
    pub fn offline(units: UnitSystem) -> Self {
        Self { api: None, units }
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    fn is_configured(&self) -> bool {
        self.api.is_some()
    }

    async fn search_locations(&self, query: &str) -> Vec<GeocodingResult> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let Some(api) = &self.api else {
            info!("OpenWeatherMap API key not configured, using mock locations");
            return mock::fallback_cities(query);
        };

        match api.geocode(query).await {
            Ok(hits) => {
                debug!(query, count = hits.len(), "geocoding finished");
                hits
            }
            Err(err) => {
                warn!(query, error = %err, "geocoding failed");
                Vec::new()
            }
        }
    }

    async fn fetch_weather(&self, lat: f64, lon: f64) -> Option<WeatherSnapshot> {
        let Some(api) = &self.api else {
            info!("OpenWeatherMap API key not configured, using mock data");
            return Some(mock::mock_snapshot(self.units));
        };

        let current = match api.current(lat, lon).await {
            Ok(current) => current,
            Err(err @ ProviderError::Decode(_)) => {
                warn!(lat, lon, error = %err, "unreadable current weather response");
                return None;
            }
            Err(err) => {
                warn!(lat, lon, error = %err, "current weather request failed, using mock data");
                return Some(mock::mock_snapshot(self.units));
            }
        };

        let forecast = match api.forecast(lat, lon).await {
            Ok(forecast) => Some(forecast),
            Err(err) => {
                warn!(lat, lon, error = %err, "forecast request failed, using current conditions only");
                None
            }
        };

        let norm = Normalization::for_current(self.units, &current);
        Some(build_snapshot(&current, forecast.as_ref(), &norm))
    }
}
