//! One-shot device position requests.

use std::{rc::Rc, time::Duration};

use futures_util::{FutureExt, future::LocalBoxFuture};
use shared::Coordinate;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("geolocation is not available on this device")]
    NoCapability,
    #[error("location permission was denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("position unavailable")]
    Unavailable,
}

impl GeoError {
    /// Maps a browser `GeolocationPositionError.code`.
    pub fn from_position_code(code: u16) -> Self {
        match code {
            1 => GeoError::PermissionDenied,
            3 => GeoError::Timeout,
            _ => GeoError::Unavailable,
        }
    }

    /// Inline explanation shown next to the location button.
    pub fn explanation(self) -> &'static str {
        match self {
            GeoError::NoCapability => "Location is not available in this browser.",
            GeoError::PermissionDenied | GeoError::Unavailable => {
                "Location access is required. Press the button again and choose \"Allow\"."
            }
            GeoError::Timeout => {
                "Finding your location took too long. Press the button to try again."
            }
        }
    }
}

pub const LOCATION_SET_MESSAGE: &str = "📍 Location set. Routes are now sorted by distance.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Accepted age of a cached fix; zero forces a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Host capability able to produce a position fix.
pub trait Geolocator {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> LocalBoxFuture<'_, Result<Coordinate, GeoError>>;
}

pub type PositionRequest = LocalBoxFuture<'static, Result<Coordinate, GeoError>>;

pub struct GeolocationController<G> {
    geolocator: Option<Rc<G>>,
    options: PositionOptions,
    locating: bool,
}

impl<G: Geolocator + 'static> GeolocationController<G> {
    /// `None` models a host without geolocation support.
    pub fn new(geolocator: Option<G>) -> Self {
        Self {
            geolocator: geolocator.map(Rc::new),
            options: PositionOptions::default(),
            locating: false,
        }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_locating(&self) -> bool {
        self.locating
    }

    /// Starts a request. Fails right away when the host has no capability.
    /// The returned future owns everything it needs, so it can be handed to
    /// the message loop; report its output through [`Self::finish`].
    pub fn begin(&mut self) -> Result<PositionRequest, GeoError> {
        let geolocator = self.geolocator.clone().ok_or(GeoError::NoCapability)?;
        let options = self.options;
        self.locating = true;
        tracing::debug!(timeout_ms = options.timeout.as_millis() as u64, "requesting position");
        Ok(async move { geolocator.current_position(&options).await }.boxed_local())
    }

    pub fn finish(&mut self, result: &Result<Coordinate, GeoError>) {
        self.locating = false;
        match result {
            Ok(coord) => tracing::info!(lat = coord.lat, lon = coord.lon, "position acquired"),
            Err(err) => tracing::warn!(error = %err, "position request failed"),
        }
    }

    pub async fn request_location(&mut self) -> Result<Coordinate, GeoError> {
        let request = self.begin()?;
        let result = request.await;
        self.finish(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedGeolocator {
        result: Result<Coordinate, GeoError>,
        seen: RefCell<Vec<PositionOptions>>,
    }

    impl Geolocator for ScriptedGeolocator {
        fn current_position(
            &self,
            options: &PositionOptions,
        ) -> LocalBoxFuture<'_, Result<Coordinate, GeoError>> {
            self.seen.borrow_mut().push(*options);
            let result = self.result;
            async move { result }.boxed_local()
        }
    }

    fn scripted(result: Result<Coordinate, GeoError>) -> ScriptedGeolocator {
        ScriptedGeolocator {
            result,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn browser_codes_map_to_modes() {
        assert_eq!(GeoError::from_position_code(1), GeoError::PermissionDenied);
        assert_eq!(GeoError::from_position_code(2), GeoError::Unavailable);
        assert_eq!(GeoError::from_position_code(3), GeoError::Timeout);
        assert_eq!(GeoError::from_position_code(0), GeoError::Unavailable);
    }

    #[tokio::test]
    async fn missing_capability_fails_immediately() {
        let mut controller = GeolocationController::<ScriptedGeolocator>::new(None);
        assert_eq!(
            controller.request_location().await,
            Err(GeoError::NoCapability)
        );
        assert!(!controller.is_locating());
    }

    #[tokio::test]
    async fn requests_fresh_fix_with_timeout() {
        let mut controller =
            GeolocationController::new(Some(scripted(Ok(Coordinate::new(37.5, 127.03)))));
        let coord = controller.request_location().await.unwrap();
        assert_eq!(coord, Coordinate::new(37.5, 127.03));

        let geolocator = controller.geolocator.as_ref().unwrap();
        let seen = geolocator.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].maximum_age, Duration::ZERO);
        assert_eq!(seen[0].timeout, Duration::from_secs(10));
        assert!(seen[0].high_accuracy);
    }

    #[tokio::test]
    async fn failure_is_reported_and_clears_locating() {
        let mut controller = GeolocationController::new(Some(scripted(Err(GeoError::Timeout))));
        let request = controller.begin().unwrap();
        assert!(controller.is_locating());
        let result = request.await;
        controller.finish(&result);
        assert_eq!(result, Err(GeoError::Timeout));
        assert!(!controller.is_locating());
    }
}
