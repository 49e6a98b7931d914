//! Device geolocation and reverse geocoding for location-aware chat
//! queries.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, anyhow};
use futures::channel::oneshot;
use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{
    GeolocationPosition, GeolocationPositionError, PositionOptions,
};

/// A resolved device position is reused for this long before asking the
/// browser again.
pub const POSITION_MAX_AGE: SignedDuration = SignedDuration::from_mins(5);

const NOMINATIM_URL: &str =
    "https://nominatim.openstreetmap.org/reverse";

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error(
        "Geolocation is not supported by your browser. Please specify a \
         city/state in your query."
    )]
    Unsupported,
    #[error(
        "Unable to get your location. Please allow location access or \
         specify a city/state in your query."
    )]
    Denied,
}

/// A device position with whatever the geocoder could name it.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub obtained_at: Timestamp,
}

impl GeoFix {
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        now.duration_since(self.obtained_at) < POSITION_MAX_AGE
    }
}

/// Resolve the device position once through the browser geolocation API.
pub async fn current_position() -> Result<(f64, f64), GeoError> {
    let window = web_sys::window().ok_or(GeoError::Unsupported)?;
    let geolocation = window
        .navigator()
        .geolocation()
        .map_err(|_| GeoError::Unsupported)?;

    let (sender, receiver) = oneshot::channel();
    let sender = Rc::new(RefCell::new(Some(sender)));

    let on_success = {
        let sender = sender.clone();
        Closure::once(move |position: GeolocationPosition| {
            if let Some(sender) = sender.borrow_mut().take() {
                let coords = position.coords();
                let _ = sender.send(Ok((
                    coords.latitude(),
                    coords.longitude(),
                )));
            }
        })
    };
    let on_failure = {
        let sender = sender.clone();
        Closure::once(move |error: GeolocationPositionError| {
            tracing::warn!(
                code = error.code(),
                message = %error.message(),
                "geolocation request failed"
            );
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(Err(GeoError::Denied));
            }
        })
    };

    let options = PositionOptions::new();
    options.set_enable_high_accuracy(true);
    options.set_timeout(10_000);
    options.set_maximum_age(POSITION_MAX_AGE.as_millis() as u32);

    geolocation.get_current_position_with_error_callback_and_options(
        on_success.as_ref().unchecked_ref(),
        Some(on_failure.as_ref().unchecked_ref()),
        &options,
    );
    on_success.forget();
    on_failure.forget();

    receiver.await.unwrap_or(Err(GeoError::Unsupported))
}

#[derive(Debug, Clone, Deserialize, Default)]
struct NominatimAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

impl NominatimAddress {
    fn city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
            .or_else(|| self.county.clone())
    }

    fn state(&self) -> Option<String> {
        self.state.clone().or_else(|| self.region.clone())
    }
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    address: NominatimAddress,
}

/// Name a coordinate pair. Failure here only costs the city/state fields
/// on the outbound message, never the message itself.
pub async fn reverse_geocode(
    latitude: f64,
    longitude: f64,
) -> anyhow::Result<(Option<String>, Option<String>)> {
    let response = reqwest::Client::new()
        .get(NOMINATIM_URL)
        .query(&[
            ("format", "json".to_string()),
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("addressdetails", "1".to_string()),
        ])
        .send()
        .await
        .context("reverse geocoding request failed")?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "reverse geocoding returned {}",
            response.status()
        ));
    }
    let reverse: NominatimReverse = response
        .json()
        .await
        .context("reverse geocoding response was not json")?;
    Ok((reverse.address.city(), reverse.address.state()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_falls_back_through_the_documented_chain() {
        let address = NominatimAddress {
            town: Some("Alibag".into()),
            county: Some("Raigad".into()),
            ..Default::default()
        };
        assert_eq!(address.city().as_deref(), Some("Alibag"));

        let address = NominatimAddress {
            county: Some("Raigad".into()),
            region: Some("Konkan".into()),
            ..Default::default()
        };
        assert_eq!(address.city().as_deref(), Some("Raigad"));
        assert_eq!(address.state().as_deref(), Some("Konkan"));
    }

    #[test]
    fn nominatim_payload_decodes_without_an_address() {
        let reverse: NominatimReverse =
            serde_json::from_str("{}").unwrap();
        assert_eq!(reverse.address.city(), None);
    }

    #[test]
    fn fixes_age_out_after_five_minutes() {
        let now = Timestamp::now();
        let fix = GeoFix {
            latitude: 18.6,
            longitude: 72.8,
            city: None,
            state: None,
            obtained_at: now,
        };
        assert!(fix.is_fresh(now + SignedDuration::from_mins(4)));
        assert!(!fix.is_fresh(now + SignedDuration::from_mins(6)));
    }
}
