//! Browser implementations of the geolocation and HTTP seams.

use futures_util::{FutureExt, future::LocalBoxFuture};
use seed::fetch::{FetchError as HttpError, Request};
use serde::{Deserialize, de::DeserializeOwned};
use shared::{Coordinate, DiagnosisRecord, WalkRoutesPayload};
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};
use wasm_bindgen_futures::JsFuture;

use crate::{
    config::ClientConfig,
    fetch::{FetchError, RouteApi, RouteQuery},
    geolocation::{GeoError, Geolocator, PositionOptions},
};

#[wasm_bindgen(module = "/naver_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = hasGeolocation)]
    fn has_geolocation() -> bool;
    #[wasm_bindgen(js_name = getCurrentPosition)]
    fn get_current_position(high_accuracy: bool, timeout_ms: u32, maximum_age_ms: u32)
    -> js_sys::Promise;
    #[wasm_bindgen(js_name = openExternal)]
    fn open_external_js(url: &str);
}

/// Opens `url` in a new browsing context without waiting on it.
pub fn open_external(url: &str) {
    tracing::debug!(url, "opening external link");
    open_external_js(url);
}

#[derive(Deserialize)]
struct PositionFailure {
    code: u16,
}

pub struct BrowserGeolocator;

impl BrowserGeolocator {
    /// `None` when `navigator.geolocation` is missing.
    pub fn detect() -> Option<Self> {
        has_geolocation().then_some(Self)
    }
}

impl Geolocator for BrowserGeolocator {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> LocalBoxFuture<'_, Result<Coordinate, GeoError>> {
        let promise = get_current_position(
            options.high_accuracy,
            options.timeout.as_millis() as u32,
            options.maximum_age.as_millis() as u32,
        );
        async move {
            match JsFuture::from(promise).await {
                Ok(value) => serde_wasm_bindgen::from_value::<Coordinate>(value)
                    .map_err(|_| GeoError::Unavailable),
                Err(failure) => Err(position_error(failure)),
            }
        }
        .boxed_local()
    }
}

fn position_error(failure: JsValue) -> GeoError {
    serde_wasm_bindgen::from_value::<PositionFailure>(failure)
        .map(|f| GeoError::from_position_code(f.code))
        .unwrap_or(GeoError::Unavailable)
}

pub struct HttpRouteApi {
    config: ClientConfig,
}

impl HttpRouteApi {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl RouteApi for HttpRouteApi {
    fn walk_routes(
        &self,
        query: &RouteQuery,
    ) -> LocalBoxFuture<'_, Result<WalkRoutesPayload, FetchError>> {
        get_json(query.url(&self.config.walk_routes_url())).boxed_local()
    }

    fn diagnosis_history(&self) -> LocalBoxFuture<'_, Result<Vec<DiagnosisRecord>, FetchError>> {
        get_json(self.config.diagnosis_history_url()).boxed_local()
    }
}

async fn get_json<T: DeserializeOwned + 'static>(url: String) -> Result<T, FetchError> {
    let raw = Request::new(url)
        .fetch()
        .await
        .map_err(|err| FetchError::Transport(format!("{err:?}")))?;
    let response = raw.check_status().map_err(|err| match err {
        HttpError::StatusError(status) => FetchError::Status(status.code),
        other => FetchError::Transport(format!("{other:?}")),
    })?;
    response
        .json::<T>()
        .await
        .map_err(|err| FetchError::Decode(format!("{err:?}")))
}
