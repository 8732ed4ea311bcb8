//! One-shot browser geolocation, exposed as a future.

use crate::config::{LANDMARK, LANDMARK_LABEL};
use crate::Coordinate;
use futures::channel::oneshot;
use log::{debug, warn};
use std::fmt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// The environment has no geolocation API at all.
    Unsupported,
}

impl GeolocationError {
    /// Map a `PositionError.code` value.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::PositionUnavailable,
        }
    }

    /// Alert text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            GeolocationError::Unsupported => "您的瀏覽器不支援定位功能".to_string(),
            _ => format!("定位失敗，請檢查定位權限或使用「{}」快速定位", LANDMARK_LABEL),
        }
    }
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocationError::PermissionDenied => write!(f, "Location permission denied"),
            GeolocationError::PositionUnavailable => write!(f, "Position unavailable"),
            GeolocationError::Timeout => write!(f, "Timed out waiting for a position"),
            GeolocationError::Unsupported => write!(f, "Geolocation is not supported"),
        }
    }
}

impl std::error::Error for GeolocationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Landmark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserLocation {
    pub coordinate: Coordinate,
    pub source: LocationSource,
}

impl UserLocation {
    pub fn device(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            source: LocationSource::Device,
        }
    }

    /// The fixed fallback location, available without asking the browser.
    pub fn landmark() -> Self {
        Self {
            coordinate: LANDMARK,
            source: LocationSource::Landmark,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.source {
            LocationSource::Device => "你在這裡",
            LocationSource::Landmark => LANDMARK_LABEL,
        }
    }

    /// Font Awesome glyph for the user marker.
    pub fn icon(&self) -> &'static str {
        match self.source {
            LocationSource::Device => "fa-user",
            LocationSource::Landmark => "fa-train",
        }
    }
}

/// Ask the browser for the current position once.
///
/// Each call is independent; nothing stops a second request while the first
/// is outstanding, and whichever resolves last is what the caller applies.
pub async fn current_position() -> Result<Coordinate, GeolocationError> {
    let geolocation = gloo_utils::window()
        .navigator()
        .geolocation()
        .map_err(|_| GeolocationError::Unsupported)?;

    let (tx, rx) = oneshot::channel::<Result<Coordinate, GeolocationError>>();
    let tx = std::rc::Rc::new(std::cell::RefCell::new(Some(tx)));

    let on_success = {
        let tx = tx.clone();
        Closure::once(move |position: web_sys::Position| {
            let coords = position.coords();
            let coordinate = Coordinate::new(coords.latitude(), coords.longitude());
            debug!("Geolocation resolved to {:?}", coordinate);
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(coordinate));
            }
        })
    };

    let on_error = {
        let tx = tx.clone();
        Closure::once(move |error: web_sys::PositionError| {
            let err = GeolocationError::from_code(error.code());
            warn!("Geolocation failed: {} ({})", err, error.message());
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(err));
            }
        })
    };

    geolocation
        .get_current_position_with_error_callback(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
        )
        .map_err(|_| GeolocationError::Unsupported)?;

    // The closures must outlive the browser callback, which fires after this frame.
    let result = rx.await.unwrap_or(Err(GeolocationError::PositionUnavailable));
    drop(on_success);
    drop(on_error);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_js_type<T: JsCast>() {}

    #[test]
    fn callbacks_take_the_stable_position_types() {
        assert_js_type::<web_sys::Position>();
        assert_js_type::<web_sys::PositionError>();
    }

    #[test]
    fn maps_position_error_codes() {
        assert_eq!(GeolocationError::from_code(1), GeolocationError::PermissionDenied);
        assert_eq!(GeolocationError::from_code(2), GeolocationError::PositionUnavailable);
        assert_eq!(GeolocationError::from_code(3), GeolocationError::Timeout);
        assert_eq!(GeolocationError::from_code(42), GeolocationError::PositionUnavailable);
    }

    #[test]
    fn failure_message_points_at_the_landmark() {
        assert!(GeolocationError::Timeout.user_message().contains(LANDMARK_LABEL));
        assert!(!GeolocationError::Unsupported.user_message().contains(LANDMARK_LABEL));
    }

    #[test]
    fn landmark_is_the_fixed_station_coordinate() {
        let loc = UserLocation::landmark();
        assert_eq!(loc.coordinate, Coordinate::new(25.0478, 121.5170));
        assert_eq!(loc.label(), "臺北車站");
        assert_eq!(loc.icon(), "fa-train");
        assert_eq!(UserLocation::device(LANDMARK).label(), "你在這裡");
    }
}
