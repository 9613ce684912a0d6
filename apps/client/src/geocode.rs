//! Reverse geocoding of GPS coordinates via Nominatim.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// The part of Nominatim's `/reverse` reply we use.
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
    error: Option<String>,
}

/// How an address was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStatus {
    Resolved,
    /// Geocoding failed; the address is the raw coordinates.
    CoordinatesOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub address: String,
    pub status: LocateStatus,
}

pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "CivicFlow/",
                env!("CARGO_PKG_VERSION"),
                " (civic-complaint-helper)"
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn reverse_url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}/reverse?format=json&lat={lat}&lon={lon}&zoom=18&addressdetails=1",
            self.base_url
        )
    }

    /// Display address for the coordinates.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<String> {
        let url = self.reverse_url(lat, lon);
        debug!("Reverse geocoding: {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Geocode(format!("Nominatim returned {status}")));
        }

        let reply: NominatimReverse = response.json().await?;
        match reply.display_name.filter(|name| !name.trim().is_empty()) {
            Some(name) => Ok(name),
            None => Err(ClientError::Geocode(
                reply
                    .error
                    .unwrap_or_else(|| "no address for these coordinates".to_string()),
            )),
        }
    }

    /// Never fails: falls back to `"<lat>, <lon>"`.
    pub async fn locate(&self, lat: f64, lon: f64) -> Located {
        match self.reverse(lat, lon).await {
            Ok(address) => Located {
                address,
                status: LocateStatus::Resolved,
            },
            Err(e) => {
                warn!("Reverse geocoding failed, using raw coordinates: {e}");
                Located {
                    address: format_coordinates(lat, lon),
                    status: LocateStatus::CoordinatesOnly,
                }
            }
        }
    }
}

pub fn format_coordinates(lat: f64, lon: f64) -> String {
    format!("{lat}, {lon}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_url() {
        let geocoder = ReverseGeocoder::new("https://nominatim.example.org/").unwrap();
        assert_eq!(
            geocoder.reverse_url(24.5854, 73.7125),
            "https://nominatim.example.org/reverse?format=json&lat=24.5854&lon=73.7125&zoom=18&addressdetails=1"
        );
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(24.5854, 73.7125), "24.5854, 73.7125");
    }

    #[test]
    fn test_reply_without_address_keeps_error() {
        let reply: NominatimReverse =
            serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert!(reply.display_name.is_none());
        assert_eq!(reply.error.as_deref(), Some("Unable to geocode"));
    }

    #[tokio::test]
    async fn test_locate_falls_back_to_coordinates() {
        // Nothing listens on the discard port.
        let geocoder = ReverseGeocoder::new("http://127.0.0.1:9").unwrap();
        let located = geocoder.locate(24.5854, 73.7125).await;
        assert_eq!(located.status, LocateStatus::CoordinatesOnly);
        assert_eq!(located.address, "24.5854, 73.7125");
    }
}
