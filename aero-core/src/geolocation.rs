//! Best-effort detection of where the user is.
//!
//! A terminal has no device GPS, so the default locator asks an IP
//! geolocation service. Callers bound every request with a timeout and fall
//! back to saved or default locations on any error.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{error::LocationError, model::GeoFix};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<GeoFix, LocationError>;
}

/// Always reports that geolocation is unavailable on this platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    async fn locate(&self) -> Result<GeoFix, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Coarse position from the public IP address (ip-api.com response shape).
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, rename = "countryCode")]
    country_code: Option<String>,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        Ok(Self { url: url.into(), http })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<GeoFix, LocationError> {
        let res = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Unavailable(e.to_string())
            }
        })?;

        let status = res.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!("status {status}")));
        }

        let body: IpApiResponse =
            res.json().await.map_err(|e| LocationError::Unavailable(e.to_string()))?;

        match body {
            IpApiResponse { status, lat: Some(lat), lon: Some(lon), city, country_code, .. }
                if status == "success" =>
            {
                debug!(lat, lon, ?city, "geolocated by IP");
                Ok(GeoFix { lat, lon, city, country: country_code })
            }
            IpApiResponse { message, .. } => Err(LocationError::Unavailable(
                message.unwrap_or_else(|| "no position in response".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn locator(server: &MockServer) -> IpGeolocator {
        IpGeolocator::new(format!("{}/json", server.uri()), Duration::from_secs(2))
            .expect("locator")
    }

    #[tokio::test]
    async fn successful_lookup_yields_fix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "countryCode": "DE",
                "city": "Berlin",
                "lat": 52.52,
                "lon": 13.405
            })))
            .mount(&server)
            .await;

        let fix = locator(&server).await.locate().await.expect("fix");
        assert_eq!(fix.city.as_deref(), Some("Berlin"));
        assert_eq!(fix.country.as_deref(), Some("DE"));
        assert!((fix.lat - 52.52).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failed_lookup_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range"
            })))
            .mount(&server)
            .await;

        let err = locator(&server).await.locate().await.unwrap_err();
        assert_eq!(err, LocationError::Unavailable("private range".into()));
    }

    #[tokio::test]
    async fn forbidden_is_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = locator(&server).await.locate().await.unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }

    #[tokio::test]
    async fn no_geolocation_is_unsupported() {
        assert_eq!(NoGeolocation.locate().await.unwrap_err(), LocationError::Unsupported);
    }
}
