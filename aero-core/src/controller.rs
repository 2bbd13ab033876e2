//! The weather screen: one "current weather" slot driven by user actions.
//!
//! Every path ends with something on screen. A fetch that yields nothing
//! moves to [`Status::Failed`] and is immediately retried against a fallback
//! location; only when that also fails does the state stay failed.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    Config,
    error::LocationError,
    geolocation::Geolocator,
    model::{GeoFix, GeocodingResult, Location, WeatherSnapshot},
    provider::{MIN_QUERY_LEN, WeatherProvider},
    store::LocationStore,
};

const CURRENT_LOCATION_NAME: &str = "Current Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Everything the view renders.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub status: Status,
    pub snapshot: Option<WeatherSnapshot>,
    pub current: Option<Location>,
    /// Dismissable, non-blocking message.
    pub banner: Option<String>,
}

#[derive(Debug)]
pub struct WeatherController {
    provider: Box<dyn WeatherProvider>,
    geolocator: Box<dyn Geolocator>,
    store: LocationStore,
    default_location: Location,
    geolocation_enabled: bool,
    geolocation_timeout: Duration,
    search_debounce: Duration,
    search_generation: AtomicU64,
    state: ViewState,
}

impl WeatherController {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        geolocator: Box<dyn Geolocator>,
        store: LocationStore,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            geolocator,
            store,
            default_location: config.default_location.clone(),
            geolocation_enabled: config.geolocation,
            geolocation_timeout: config.geolocation_timeout(),
            search_debounce: config.search_debounce(),
            search_generation: AtomicU64::new(0),
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn saved_locations(&self) -> &[Location] {
        self.store.locations()
    }

    pub fn dismiss_banner(&mut self) {
        self.state.banner = None;
    }

    /// First screen: the most recent saved location, else the detected
    /// position, else the built-in default with a banner.
    pub async fn startup(&mut self) -> &ViewState {
        if let Some(first) = self.store.first().cloned() {
            debug!(location = %first.name, "starting with saved location");
            self.show(first).await;
            return &self.state;
        }

        match self.locate().await {
            Ok(fix) => {
                self.show_position(fix).await;
            }
            Err(err) => {
                warn!(error = %err, "geolocation failed, using default location");
                self.state.banner = Some(location_banner(&err));
                self.show(self.default_location.clone()).await;
            }
        }

        &self.state
    }

    /// Detect the current position and show it. A failure only surfaces as a
    /// banner when nothing better is already available.
    pub async fn use_my_location(&mut self) -> &ViewState {
        match self.locate().await {
            Ok(fix) => {
                self.show_position(fix).await;
            }
            Err(err) => {
                warn!(error = %err, "geolocation failed");
                if self.state.snapshot.is_none() {
                    self.state.banner = Some(location_banner(&err));
                    let fallback =
                        self.store.first().cloned().unwrap_or_else(|| self.default_location.clone());
                    self.show(fallback).await;
                }
            }
        }

        &self.state
    }

    /// Immediate search. Short queries yield nothing.
    pub async fn search(&self, query: &str) -> Vec<GeocodingResult> {
        if query.trim().chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }
        self.provider.search_locations(query).await
    }

    /// Search after the debounce delay. Returns `None` when a newer call
    /// arrived in the meantime.
    pub async fn search_debounced(&self, query: &str) -> Option<Vec<GeocodingResult>> {
        let ticket = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.trim().chars().count() < MIN_QUERY_LEN {
            return Some(Vec::new());
        }

        tokio::time::sleep(self.search_debounce).await;

        if self.search_generation.load(Ordering::SeqCst) != ticket {
            debug!(query, "search superseded");
            return None;
        }
        Some(self.provider.search_locations(query).await)
    }

    /// Save a search hit (once per id), then show it.
    pub async fn select(&mut self, result: GeocodingResult) -> &ViewState {
        let location = result.into_location();
        if !self.store.add(location.clone()) {
            self.store.promote(&location.id);
        }

        info!(location = %location.full_name, "selected location");
        self.show(location).await;
        &self.state
    }

    /// Show a saved location, moving it to the front. `None` for unknown ids.
    pub async fn select_saved(&mut self, id: &str) -> Option<&ViewState> {
        let location = self.store.get(id).cloned()?;
        self.store.promote(id);
        self.show(location).await;
        Some(&self.state)
    }

    /// Re-fetch the location currently on screen, matched by name against
    /// the saved list; else the first saved one; else the default.
    pub async fn refresh(&mut self) -> &ViewState {
        let names = [
            self.state.current.as_ref().map(|l| l.name.clone()),
            self.state.snapshot.as_ref().map(|s| s.location.clone()),
        ];

        let target = names
            .iter()
            .flatten()
            .find_map(|name| self.store.find_by_name(name).cloned())
            .or_else(|| self.store.first().cloned())
            .unwrap_or_else(|| self.default_location.clone());

        self.show(target).await;
        &self.state
    }

    pub fn remove_location(&mut self, id: &str) -> bool {
        self.store.remove(id)
    }

    /// Show weather for a raw position and remember it as a saved location.
    /// Unnamed positions take their name from a live provider.
    pub async fn show_position(&mut self, fix: GeoFix) -> &ViewState {
        let named = fix.city.is_some() || !self.provider.is_configured();
        let mut location = Location::new(
            fix.city.unwrap_or_else(|| CURRENT_LOCATION_NAME.to_string()),
            fix.lat,
            fix.lon,
            fix.country.unwrap_or_default(),
            None,
        );

        if !self.show(location.clone()).await {
            return &self.state;
        }

        let provider_name = self
            .state
            .snapshot
            .as_ref()
            .map(|s| s.location.clone())
            .filter(|name| !named && !name.is_empty());
        if let Some(name) = provider_name {
            location = Location::new(name, location.lat, location.lon, location.country, None);
            self.state.current = Some(location.clone());
        }

        if !self.store.add(location.clone()) {
            self.store.promote(&location.id);
        }
        &self.state
    }

    async fn locate(&self) -> Result<GeoFix, LocationError> {
        if !self.geolocation_enabled {
            return Err(LocationError::Unsupported);
        }

        tokio::time::timeout(self.geolocation_timeout, self.geolocator.locate())
            .await
            .unwrap_or(Err(LocationError::Timeout))
    }

    /// Fetch `location` into the slot, recovering through the fallback
    /// location on failure. Returns whether `location` itself was loaded.
    async fn show(&mut self, location: Location) -> bool {
        if self.load(location.clone()).await {
            return true;
        }

        let fallback = self.fallback_for(&location);
        if fallback.id != location.id && self.load(fallback.clone()).await {
            self.state.banner = Some(format!(
                "Couldn't load weather for {}. Showing {} instead.",
                location.name, fallback.name
            ));
            return false;
        }

        self.state.banner = Some("Weather is unavailable right now. Try refreshing.".to_string());
        false
    }

    async fn load(&mut self, location: Location) -> bool {
        self.state.status = Status::Loading;
        debug!(location = %location.name, lat = location.lat, lon = location.lon, "fetching weather");

        let fetched = self.provider.fetch_weather(location.lat, location.lon).await;
        match fetched {
            Some(snapshot) => {
                self.state.snapshot = Some(snapshot);
                self.state.current = Some(location);
                self.state.status = Status::Loaded;
                true
            }
            None => {
                warn!(location = %location.name, "weather fetch failed");
                self.state.status = Status::Failed;
                false
            }
        }
    }

    fn fallback_for(&self, failed: &Location) -> Location {
        self.store
            .locations()
            .iter()
            .find(|l| l.id != failed.id)
            .cloned()
            .unwrap_or_else(|| self.default_location.clone())
    }
}

fn location_banner(err: &LocationError) -> String {
    match err {
        LocationError::PermissionDenied => {
            "Location access was denied. Showing the default location.".to_string()
        }
        LocationError::Unsupported => {
            "Location detection isn't available. Showing the default location.".to_string()
        }
        LocationError::Timeout => {
            "Finding your location took too long. Showing the default location.".to_string()
        }
        LocationError::Unavailable(_) => {
            "Your location couldn't be determined. Showing the default location.".to_string()
        }
    }
}
