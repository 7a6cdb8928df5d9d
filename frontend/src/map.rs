//! Map capability and the per-view map session.

use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use shared::{Coordinate, RouteBounds, RouteItem};

use crate::{
    markers::MarkerSyncEngine,
    script_loader::MapLoadError,
    viewport::{ViewportController, ViewportPlan},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Everything the core needs from an interactive map SDK.
///
/// Handles are cheap clones of SDK objects; click handlers receive clones of
/// them.
pub trait MapProvider {
    type Map: Clone + 'static;
    type Marker: Clone + 'static;
    type Popup: Clone + 'static;
    type Listener;

    fn load(&self) -> LocalBoxFuture<'static, Result<(), MapLoadError>>;
    fn create_map(&self, options: &MapOptions) -> Self::Map;
    fn set_center(&self, map: &Self::Map, center: Coordinate);
    fn set_zoom(&self, map: &Self::Map, zoom: u8);
    fn fit_bounds(&self, map: &Self::Map, bounds: &RouteBounds, padding: u32);
    fn create_marker(&self, map: &Self::Map, position: Coordinate) -> Self::Marker;
    fn remove_marker(&self, marker: &Self::Marker);
    fn create_info_window(&self) -> Self::Popup;
    fn open_info_window(
        &self,
        popup: &Self::Popup,
        map: &Self::Map,
        marker: &Self::Marker,
        html: &str,
    );
    fn close_info_window(&self, popup: &Self::Popup);
    fn on_marker_click(&self, marker: &Self::Marker, handler: Box<dyn Fn()>) -> Self::Listener;
    fn remove_listener(&self, listener: Self::Listener);
}

/// Map instance plus everything placed on it for one mounted view.
///
/// Dropping the session tears it down: listeners are removed, the popup is
/// closed and every marker is taken off the map.
pub struct MapSession<P: MapProvider + 'static> {
    provider: Rc<P>,
    map: P::Map,
    markers: MarkerSyncEngine<P>,
    viewport: ViewportController,
}

impl<P: MapProvider + 'static> MapSession<P> {
    /// Creates the map. The SDK must already be loaded.
    pub fn mount(provider: Rc<P>, options: &MapOptions) -> Self {
        let map = provider.create_map(options);
        tracing::info!(
            lat = options.center.lat,
            lon = options.center.lon,
            zoom = options.zoom,
            "map mounted"
        );
        Self {
            markers: MarkerSyncEngine::new(Rc::clone(&provider)),
            provider,
            map,
            viewport: ViewportController::default(),
        }
    }

    /// Loads the SDK through the provider, then mounts.
    pub async fn open(provider: Rc<P>, options: MapOptions) -> Result<Self, MapLoadError> {
        provider.load().await?;
        Ok(Self::mount(provider, &options))
    }

    /// Brings markers and viewport in line with the current inputs. The
    /// viewport is only moved when its inputs changed since the last call.
    pub fn refresh(&mut self, user: Option<Coordinate>, routes: &[RouteItem]) {
        self.markers.sync(&self.map, user, routes);
        if let Some(plan) = self.viewport.update(user, routes) {
            self.apply(&plan);
        }
    }

    pub fn apply(&self, plan: &ViewportPlan) {
        match *plan {
            ViewportPlan::LockToUser { center, zoom }
            | ViewportPlan::CenterOnPoint { center, zoom }
            | ViewportPlan::Fallback { center, zoom } => {
                self.provider.set_center(&self.map, center);
                self.provider.set_zoom(&self.map, zoom);
            }
            ViewportPlan::FitBounds { bounds, padding } => {
                self.provider.fit_bounds(&self.map, &bounds, padding);
            }
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.marker_count()
    }

    pub fn teardown(&mut self) {
        self.markers.clear();
    }
}

impl<P: MapProvider + 'static> Drop for MapSession<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeMap, MapCall};
    use super::*;
    use crate::viewport::{CLOSE_IN_ZOOM, DEFAULT_CENTER, DEFAULT_ZOOM};

    fn route(id: &str, lat: f64, lon: f64) -> RouteItem {
        RouteItem {
            id: id.into(),
            name: id.into(),
            region: String::new(),
            difficulty: String::new(),
            distance: None,
            duration: None,
            description: String::new(),
            address: String::new(),
            lat: Some(lat),
            lon: Some(lon),
            source: shared::RouteSource::Park,
            distance_from_user_km: None,
            tags: Vec::new(),
        }
    }

    fn options() -> MapOptions {
        MapOptions {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }

    #[tokio::test]
    async fn open_fails_when_sdk_cannot_load() {
        let provider = Rc::new(FakeMap::failing(MapLoadError::AuthFailure));
        let result = MapSession::open(Rc::clone(&provider), options()).await;
        assert!(matches!(result, Err(MapLoadError::AuthFailure)));
        assert!(provider.take_calls().is_empty());
    }

    #[test]
    fn unchanged_inputs_do_not_move_the_viewport() {
        let provider = Rc::new(FakeMap::default());
        let mut session = MapSession::mount(Rc::clone(&provider), &options());
        let routes = vec![route("a", 37.51, 127.02)];
        session.refresh(None, &routes);
        let calls = provider.take_calls();
        assert!(calls.contains(&MapCall::SetZoom(CLOSE_IN_ZOOM)));

        // User pans the map; a marker-only refresh must not snap it back.
        session.refresh(None, &routes);
        let calls = provider.take_calls();
        assert!(!calls.iter().any(|c| matches!(
            c,
            MapCall::SetCenter(_) | MapCall::SetZoom(_) | MapCall::FitBounds(..)
        )));
        assert_eq!(session.marker_count(), 1);
    }

    #[test]
    fn drop_tears_everything_down() {
        let provider = Rc::new(FakeMap::default());
        {
            let mut session = MapSession::mount(Rc::clone(&provider), &options());
            session.refresh(
                Some(Coordinate::new(37.5, 127.0)),
                &[route("a", 37.51, 127.02), route("b", 37.52, 127.01)],
            );
            assert_eq!(provider.live_markers().len(), 3);
            assert_eq!(provider.listener_count(), 2);
        }
        assert!(provider.live_markers().is_empty());
        assert_eq!(provider.listener_count(), 0);
    }
}
