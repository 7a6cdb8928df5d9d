//! Marker reconciliation: the whole set is torn down and rebuilt on every
//! sync, and all route markers share a single popup.

use std::rc::Rc;

use shared::{Coordinate, RouteItem};

use crate::map::MapProvider;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Popup card with the route name and its source label.
pub fn popup_html(route: &RouteItem) -> String {
    format!(
        concat!(
            r#"<div class="route-popup">"#,
            r#"<div class="route-popup-name">{}</div>"#,
            r#"<div class="route-popup-source">{}</div>"#,
            "</div>"
        ),
        escape_html(&route.name),
        escape_html(route.source.label())
    )
}

pub struct MarkerSyncEngine<P: MapProvider> {
    provider: Rc<P>,
    markers: Vec<P::Marker>,
    listeners: Vec<P::Listener>,
    popup: Option<P::Popup>,
}

impl<P: MapProvider + 'static> MarkerSyncEngine<P> {
    pub fn new(provider: Rc<P>) -> Self {
        Self {
            provider,
            markers: Vec::new(),
            listeners: Vec::new(),
            popup: None,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Replaces every marker: one for the user if known, one per route with
    /// a usable coordinate. Routes without one are skipped silently.
    pub fn sync(&mut self, map: &P::Map, user: Option<Coordinate>, routes: &[RouteItem]) {
        self.clear();

        if let Some(user) = user {
            let marker = self.provider.create_marker(map, user);
            self.markers.push(marker);
        }

        let popup = self
            .popup
            .get_or_insert_with(|| self.provider.create_info_window())
            .clone();

        for route in routes {
            let Some(position) = route.coordinate() else {
                continue;
            };
            let marker = self.provider.create_marker(map, position);
            let handler = {
                let provider = Rc::clone(&self.provider);
                let popup = popup.clone();
                let map = map.clone();
                let marker = marker.clone();
                let html = popup_html(route);
                Box::new(move || {
                    provider.close_info_window(&popup);
                    provider.open_info_window(&popup, &map, &marker, &html);
                })
            };
            let listener = self.provider.on_marker_click(&marker, handler);
            self.listeners.push(listener);
            self.markers.push(marker);
        }

        tracing::debug!(
            markers = self.markers.len(),
            routes = routes.len(),
            user = user.is_some(),
            "markers synced"
        );
    }

    /// Removes listeners, closes the popup and takes every marker off the
    /// map.
    pub fn clear(&mut self) {
        for listener in self.listeners.drain(..) {
            self.provider.remove_listener(listener);
        }
        if let Some(popup) = &self.popup {
            self.provider.close_info_window(popup);
        }
        for marker in self.markers.drain(..) {
            self.provider.remove_marker(&marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fake::{FakeMap, MapCall};
    use shared::RouteSource;

    fn route(id: &str, name: &str, coord: Option<(f64, f64)>, source: RouteSource) -> RouteItem {
        RouteItem {
            id: id.into(),
            name: name.into(),
            region: String::new(),
            difficulty: String::new(),
            distance: None,
            duration: None,
            description: String::new(),
            address: String::new(),
            lat: coord.map(|c| c.0),
            lon: coord.map(|c| c.1),
            source,
            distance_from_user_km: None,
            tags: Vec::new(),
        }
    }

    fn engine() -> (Rc<FakeMap>, MarkerSyncEngine<FakeMap>) {
        let provider = Rc::new(FakeMap::default());
        (Rc::clone(&provider), MarkerSyncEngine::new(provider))
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Han" & 'river'</b>"#),
            "&lt;b&gt;&quot;Han&quot; &amp; &#39;river&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn popup_escapes_route_name() {
        let html = popup_html(&route(
            "a",
            "<script>alert(1)</script>",
            None,
            RouteSource::Park,
        ));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Park"));
    }

    #[test]
    fn marker_count_is_user_plus_geolocated_routes() {
        let (provider, mut engine) = engine();
        let routes = vec![
            route("a", "A", Some((37.51, 127.0)), RouteSource::Park),
            route("b", "B", None, RouteSource::Walk),
            route("c", "C", Some((f64::INFINITY, 127.0)), RouteSource::Walk),
            route("d", "D", Some((37.53, 127.02)), RouteSource::Walk),
        ];
        engine.sync(&1, Some(Coordinate::new(37.5, 127.0)), &routes);
        assert_eq!(engine.marker_count(), 3);
        assert_eq!(provider.live_markers().len(), 3);

        engine.sync(&1, None, &routes);
        assert_eq!(engine.marker_count(), 2);
        assert_eq!(provider.live_markers().len(), 2);
        assert_eq!(provider.listener_count(), 2);
    }

    #[test]
    fn every_sync_rebuilds_from_scratch() {
        let (provider, mut engine) = engine();
        let routes = vec![route("a", "A", Some((37.51, 127.0)), RouteSource::Park)];
        engine.sync(&1, None, &routes);
        let first = provider.live_markers();
        engine.sync(&1, None, &routes);
        let second = provider.live_markers();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0].0, second[0].0);
    }

    #[test]
    fn click_opens_one_shared_popup() {
        let (provider, mut engine) = engine();
        let routes = vec![
            route("a", "Seoul Forest", Some((37.54, 127.04)), RouteSource::Park),
            route("b", "Han River", Some((37.52, 126.93)), RouteSource::Walk),
        ];
        engine.sync(&1, None, &routes);
        let markers: Vec<u32> = provider.live_markers().iter().map(|(id, _)| *id).collect();
        provider.take_calls();

        provider.click(markers[0]);
        provider.click(markers[1]);
        let calls = provider.take_calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], MapCall::ClosePopup);
        assert!(matches!(&calls[1], MapCall::OpenPopup { marker, html }
            if *marker == markers[0] && html.contains("Seoul Forest")));
        assert_eq!(calls[2], MapCall::ClosePopup);
        assert!(matches!(&calls[3], MapCall::OpenPopup { marker, html }
            if *marker == markers[1] && html.contains("Walking trail")));
    }

    #[test]
    fn popup_is_reused_across_syncs() {
        let (provider, mut engine) = engine();
        let routes = vec![route("a", "A", Some((37.51, 127.0)), RouteSource::Park)];
        engine.sync(&1, None, &routes);
        engine.sync(&1, None, &routes);
        let created = provider
            .calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, MapCall::CreatePopup(_)))
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn clear_closes_popup_and_drops_listeners() {
        let (provider, mut engine) = engine();
        engine.sync(
            &1,
            None,
            &[route("a", "A", Some((37.51, 127.0)), RouteSource::Park)],
        );
        provider.take_calls();
        engine.clear();
        let calls = provider.take_calls();
        assert!(matches!(calls[0], MapCall::RemoveListener(_)));
        assert_eq!(calls[1], MapCall::ClosePopup);
        assert!(matches!(calls[2], MapCall::RemoveMarker(_)));
        assert_eq!(engine.marker_count(), 0);
    }
}
