//! Core library for the `aero-weather` client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client and its mock-data fallback
//! - Saved locations and their on-disk storage
//! - The screen controller that ties search, geolocation and fetching together
//!
//! It is used by `aero-cli`, but can also back other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod store;

pub use config::Config;
pub use controller::{Status, ViewState, WeatherController};
pub use error::{LocationError, ProviderError, StorageError};
pub use geolocation::{Geolocator, IpGeolocator, NoGeolocation};
pub use model::{
    AlertSeverity, DailyPoint, GeoFix, GeocodingResult, HourlyPoint, Location, UnitSystem,
    WeatherAlert, WeatherSnapshot,
};
pub use provider::{WeatherClient, WeatherProvider};
pub use store::{JsonFileStorage, LocationStorage, LocationStore, MemoryStorage};
