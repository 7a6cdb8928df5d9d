//! Naver Maps bindings behind [`MapProvider`] and [`ScriptHost`].

use futures_util::{FutureExt, future::LocalBoxFuture};
use shared::{Coordinate, RouteBounds};
use wasm_bindgen::{JsValue, closure::Closure, prelude::wasm_bindgen};
use wasm_bindgen_futures::JsFuture;

use crate::{
    config::ClientConfig,
    map::{MapOptions, MapProvider},
    script_loader::{MapLoadError, ScriptEvent, ScriptHost, ScriptLoader},
};

#[wasm_bindgen(module = "/naver_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = sdkPresent)]
    fn sdk_present_js() -> bool;
    #[wasm_bindgen(js_name = loadMapScript)]
    fn load_map_script(url: &str, callback: &str) -> js_sys::Promise;
    #[wasm_bindgen(js_name = createMap)]
    fn create_map_js(container: &str, lat: f64, lon: f64, zoom: u8) -> JsValue;
    #[wasm_bindgen(js_name = setCenter)]
    fn set_center_js(map: &JsValue, lat: f64, lon: f64);
    #[wasm_bindgen(js_name = setZoom)]
    fn set_zoom_js(map: &JsValue, zoom: u8);
    #[wasm_bindgen(js_name = fitBounds)]
    fn fit_bounds_js(map: &JsValue, south: f64, west: f64, north: f64, east: f64, padding: u32);
    #[wasm_bindgen(js_name = createMarker)]
    fn create_marker_js(map: &JsValue, lat: f64, lon: f64) -> JsValue;
    #[wasm_bindgen(js_name = removeMarker)]
    fn remove_marker_js(marker: &JsValue);
    #[wasm_bindgen(js_name = createInfoWindow)]
    fn create_info_window_js() -> JsValue;
    #[wasm_bindgen(js_name = openInfoWindow)]
    fn open_info_window_js(popup: &JsValue, map: &JsValue, marker: &JsValue, html: &str);
    #[wasm_bindgen(js_name = closeInfoWindow)]
    fn close_info_window_js(popup: &JsValue);
    #[wasm_bindgen(js_name = addClickListener)]
    fn add_click_listener_js(marker: &JsValue, handler: &Closure<dyn Fn()>) -> JsValue;
    #[wasm_bindgen(js_name = removeListener)]
    fn remove_listener_js(listener: &JsValue);
}

/// Injects the SDK `<script>` into the current page.
pub struct PageScriptHost;

impl ScriptHost for PageScriptHost {
    fn sdk_present(&self) -> bool {
        sdk_present_js()
    }

    fn inject(&self, url: String, callback: String) -> LocalBoxFuture<'_, ScriptEvent> {
        let promise = load_map_script(&url, &callback);
        async move {
            let outcome = JsFuture::from(promise).await.ok().and_then(|v| v.as_string());
            match outcome.as_deref() {
                Some("ready") => ScriptEvent::Ready,
                Some("auth_failure") => ScriptEvent::AuthFailure,
                _ => ScriptEvent::LoadFailure,
            }
        }
        .boxed_local()
    }
}

thread_local! {
    static LOADER: ScriptLoader<PageScriptHost> =
        ScriptLoader::new(PageScriptHost, ClientConfig::from_build_env().map_client_id);
}

/// Click listener registration; the Rust closure lives as long as it does.
pub struct NaverListener {
    handle: JsValue,
    _handler: Closure<dyn Fn()>,
}

pub struct NaverMap {
    container: &'static str,
    loader: ScriptLoader<PageScriptHost>,
}

impl NaverMap {
    /// Map drawn into the element with id `container`. All instances share
    /// the page-wide SDK loader.
    pub fn new(container: &'static str) -> Self {
        Self {
            container,
            loader: LOADER.with(ScriptLoader::clone),
        }
    }
}

impl MapProvider for NaverMap {
    type Map = JsValue;
    type Marker = JsValue;
    type Popup = JsValue;
    type Listener = NaverListener;

    fn load(&self) -> LocalBoxFuture<'static, Result<(), MapLoadError>> {
        let loader = self.loader.clone();
        async move { loader.load().await }.boxed_local()
    }

    fn create_map(&self, options: &MapOptions) -> JsValue {
        create_map_js(
            self.container,
            options.center.lat,
            options.center.lon,
            options.zoom,
        )
    }

    fn set_center(&self, map: &JsValue, center: Coordinate) {
        set_center_js(map, center.lat, center.lon);
    }

    fn set_zoom(&self, map: &JsValue, zoom: u8) {
        set_zoom_js(map, zoom);
    }

    fn fit_bounds(&self, map: &JsValue, bounds: &RouteBounds, padding: u32) {
        let sw = bounds.south_west();
        let ne = bounds.north_east();
        fit_bounds_js(map, sw.lat, sw.lon, ne.lat, ne.lon, padding);
    }

    fn create_marker(&self, map: &JsValue, position: Coordinate) -> JsValue {
        create_marker_js(map, position.lat, position.lon)
    }

    fn remove_marker(&self, marker: &JsValue) {
        remove_marker_js(marker);
    }

    fn create_info_window(&self) -> JsValue {
        create_info_window_js()
    }

    fn open_info_window(&self, popup: &JsValue, map: &JsValue, marker: &JsValue, html: &str) {
        open_info_window_js(popup, map, marker, html);
    }

    fn close_info_window(&self, popup: &JsValue) {
        close_info_window_js(popup);
    }

    fn on_marker_click(&self, marker: &JsValue, handler: Box<dyn Fn()>) -> NaverListener {
        let handler = Closure::wrap(handler);
        let handle = add_click_listener_js(marker, &handler);
        NaverListener {
            handle,
            _handler: handler,
        }
    }

    fn remove_listener(&self, listener: NaverListener) {
        remove_listener_js(&listener.handle);
    }
}
