//! End-to-end screen flows with fake providers and locators.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use aero_core::{
    Config, GeoFix, Geolocator, Location, LocationError, LocationStore, MemoryStorage,
    NoGeolocation, Status, UnitSystem, WeatherClient, WeatherController, WeatherProvider,
    WeatherSnapshot, provider::mock::mock_snapshot,
};
use async_trait::async_trait;

/// Provider whose weather carries the requested latitude as its temperature,
/// and which fails for a configurable set of latitudes.
#[derive(Debug, Default)]
struct FakeProvider {
    failing_lats: HashSet<i64>,
    searches: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    fn failing(lats: &[i64]) -> Self {
        Self { failing_lats: lats.iter().copied().collect(), ..Self::default() }
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn search_locations(&self, query: &str) -> Vec<aero_core::GeocodingResult> {
        if let Ok(mut seen) = self.searches.lock() {
            seen.push(query.to_string());
        }
        vec![aero_core::GeocodingResult {
            name: query.to_string(),
            lat: 10.0,
            lon: 20.0,
            country: "XX".into(),
            state: None,
        }]
    }

    async fn fetch_weather(&self, lat: f64, _lon: f64) -> Option<WeatherSnapshot> {
        if self.failing_lats.contains(&(lat.round() as i64)) {
            return None;
        }
        Some(WeatherSnapshot {
            location: format!("Place {}", lat.round()),
            current_temp: lat.round() as i32,
            ..mock_snapshot(UnitSystem::Metric)
        })
    }
}

#[derive(Debug)]
struct FixedLocator(Result<GeoFix, LocationError>);

#[async_trait]
impl Geolocator for FixedLocator {
    async fn locate(&self) -> Result<GeoFix, LocationError> {
        self.0.clone()
    }
}

#[derive(Debug)]
struct HangingLocator;

#[async_trait]
impl Geolocator for HangingLocator {
    async fn locate(&self) -> Result<GeoFix, LocationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(LocationError::Unavailable("never".into()))
    }
}

fn denied() -> Box<dyn Geolocator> {
    Box::new(FixedLocator(Err(LocationError::PermissionDenied)))
}

fn controller(
    provider: impl WeatherProvider + 'static,
    locator: Box<dyn Geolocator>,
    saved: Vec<Location>,
) -> WeatherController {
    let store = LocationStore::load(Box::new(MemoryStorage::with_locations(saved)));
    WeatherController::new(Box::new(provider), locator, store, &Config::default())
}

fn oslo() -> Location {
    Location::new("Oslo", 59.91, 10.75, "NO", None)
}

fn lima() -> Location {
    Location::new("Lima", -12.05, -77.04, "PE", None)
}

#[tokio::test]
async fn denied_geolocation_without_saved_locations_shows_default_with_banner() {
    let mut c = controller(FakeProvider::default(), denied(), Vec::new());

    let state = c.startup().await;

    assert_eq!(state.status, Status::Loaded);
    assert_eq!(state.current.as_ref().map(|l| l.name.as_str()), Some("San Francisco"));
    assert!(state.snapshot.is_some());
    assert!(state.banner.is_some());

    c.dismiss_banner();
    assert!(c.state().banner.is_none());
    assert_eq!(c.state().status, Status::Loaded);
}

#[tokio::test]
async fn unsupported_geolocation_behaves_like_denial() {
    let mut c = controller(FakeProvider::default(), Box::new(NoGeolocation), Vec::new());

    let state = c.startup().await;
    assert_eq!(state.status, Status::Loaded);
    assert!(state.banner.is_some());
}

#[tokio::test(start_paused = true)]
async fn slow_geolocation_times_out_to_default() {
    let mut c = controller(FakeProvider::default(), Box::new(HangingLocator), Vec::new());

    let state = c.startup().await;
    assert_eq!(state.status, Status::Loaded);
    assert_eq!(state.current.as_ref().map(|l| l.name.as_str()), Some("San Francisco"));
    assert!(state.banner.as_deref().is_some_and(|b| b.contains("too long")));
}

#[tokio::test]
async fn startup_prefers_first_saved_location() {
    let mut c = controller(FakeProvider::default(), denied(), vec![oslo(), lima()]);

    let state = c.startup().await;

    assert_eq!(state.status, Status::Loaded);
    assert_eq!(state.current.as_ref(), Some(&oslo()));
    assert_eq!(state.snapshot.as_ref().map(|s| s.current_temp), Some(60));
    assert!(state.banner.is_none());
}

#[tokio::test]
async fn startup_geolocates_and_saves_position() {
    let fix = GeoFix { lat: 48.85, lon: 2.35, city: Some("Paris".into()), country: Some("FR".into()) };
    let mut c = controller(FakeProvider::default(), Box::new(FixedLocator(Ok(fix))), Vec::new());

    let state = c.startup().await;
    assert_eq!(state.status, Status::Loaded);
    assert_eq!(state.current.as_ref().map(|l| l.full_name.as_str()), Some("Paris, FR"));

    assert_eq!(c.saved_locations().len(), 1);
    assert_eq!(c.saved_locations()[0].id, "48.85_2.35");
}

#[tokio::test]
async fn unnamed_position_takes_provider_name() {
    let mut c = controller(FakeProvider::default(), denied(), Vec::new());

    let fix = GeoFix { lat: 33.0, lon: 44.0, city: None, country: None };
    let state = c.show_position(fix).await;

    assert_eq!(state.current.as_ref().map(|l| l.name.as_str()), Some("Place 33"));
    assert_eq!(c.saved_locations()[0].name, "Place 33");
}

#[tokio::test]
async fn unnamed_position_keeps_placeholder_with_mock_data() {
    let mut c = controller(WeatherClient::offline(UnitSystem::Metric), denied(), Vec::new());

    let fix = GeoFix { lat: -1.29, lon: 36.82, city: None, country: None };
    let state = c.show_position(fix).await;

    assert_eq!(state.status, Status::Loaded);
    assert_eq!(state.current.as_ref().map(|l| l.name.as_str()), Some("Current Location"));
    assert_eq!(c.saved_locations()[0].name, "Current Location");
    assert_eq!(c.saved_locations()[0].id, "-1.29_36.82");
}

#[tokio::test]
async fn failed_fetch_recovers_with_fallback_location() {
    let mut c = controller(FakeProvider::failing(&[60]), denied(), vec![oslo(), lima()]);

    let state = c.startup().await;

    assert_eq!(state.status, Status::Loaded);
    assert_eq!(state.current.as_ref(), Some(&lima()));
    assert!(state.banner.as_deref().is_some_and(|b| b.contains("Oslo")));
}

#[tokio::test]
async fn failure_without_any_working_location_stays_failed() {
    // 60 = Oslo, 38 = default San Francisco
    let mut c = controller(FakeProvider::failing(&[60, 38]), denied(), vec![oslo()]);

    let state = c.startup().await;

    assert_eq!(state.status, Status::Failed);
    assert!(state.banner.is_some());
}

#[tokio::test]
async fn select_saves_once_and_moves_to_front() {
    let mut c = controller(FakeProvider::default(), denied(), vec![oslo()]);

    let hits = c.search("Bogota").await;
    assert_eq!(hits.len(), 1);

    c.select(hits[0].clone()).await;
    c.select(hits[0].clone()).await;

    let names: Vec<_> = c.saved_locations().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Bogota", "Oslo"]);
    assert_eq!(c.state().status, Status::Loaded);
    assert_eq!(c.state().current.as_ref().map(|l| l.id.as_str()), Some("10_20"));
}

#[tokio::test]
async fn short_search_skips_provider() {
    let provider = FakeProvider::default();
    let searches = provider.searches.clone();
    let c = controller(provider, denied(), Vec::new());

    assert!(c.search("B").await.is_empty());
    assert!(c.search("  ").await.is_empty());
    assert!(searches.lock().map(|s| s.is_empty()).unwrap_or(false));
}

#[tokio::test(start_paused = true)]
async fn debounced_search_keeps_only_latest_query() {
    let provider = FakeProvider::default();
    let searches = provider.searches.clone();
    let c = controller(provider, denied(), Vec::new());

    let (first, second) = tokio::join!(c.search_debounced("Lo"), c.search_debounced("Lon"));

    assert!(first.is_none());
    assert_eq!(second.map(|hits| hits[0].name.clone()).as_deref(), Some("Lon"));
    assert_eq!(searches.lock().map(|s| s.clone()).unwrap_or_default(), ["Lon"]);
}

#[tokio::test]
async fn refresh_matches_current_by_name() {
    let mut c = controller(FakeProvider::default(), denied(), vec![oslo(), lima()]);

    c.select_saved(&lima().id).await.expect("saved");
    let state = c.refresh().await;
    assert_eq!(state.current.as_ref(), Some(&lima()));

    // Unknown current location falls back to the first saved entry.
    let mut c = controller(FakeProvider::default(), denied(), vec![oslo()]);
    c.show_position(GeoFix { lat: 5.0, lon: 5.0, city: Some("Nowhere".into()), country: None })
        .await;
    c.remove_location(&Location::new("Nowhere", 5.0, 5.0, "", None).id);
    let state = c.refresh().await;
    assert_eq!(state.current.as_ref(), Some(&oslo()));
}

#[tokio::test]
async fn refresh_without_saved_locations_uses_default() {
    let mut c = controller(FakeProvider::default(), denied(), Vec::new());

    let state = c.refresh().await;
    assert_eq!(state.current.as_ref().map(|l| l.name.as_str()), Some("San Francisco"));
}

#[tokio::test]
async fn removing_unknown_location_is_noop() {
    let mut c = controller(FakeProvider::default(), denied(), vec![oslo()]);

    assert!(!c.remove_location("nope"));
    assert_eq!(c.saved_locations().len(), 1);
    assert!(c.select_saved("nope").await.is_none());
}

#[tokio::test]
async fn use_my_location_failure_keeps_existing_screen_quiet() {
    let mut c = controller(FakeProvider::default(), denied(), vec![oslo()]);
    c.startup().await;

    let state = c.use_my_location().await;
    assert_eq!(state.current.as_ref(), Some(&oslo()));
    assert!(state.banner.is_none());
}

#[tokio::test]
async fn unconfigured_client_search_and_select_serves_mock_weather() {
    let mut c = controller(
        WeatherClient::from_config(&Config::default()).expect("client"),
        denied(),
        Vec::new(),
    );

    let hits = c.search("San").await;
    let sf = hits.into_iter().find(|h| h.name == "San Francisco").expect("San Francisco");

    let state = c.select(sf).await;
    assert_eq!(state.status, Status::Loaded);
    assert_eq!(state.snapshot.as_ref().map(|s| s.current_temp), Some(22));
}
