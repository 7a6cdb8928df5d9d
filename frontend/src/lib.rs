//! Walk route page: filter tabs, route list and a synchronized map.
//!
//! The state machines (`filter`, `fetch`, `pagination`, `geolocation`,
//! `script_loader`, `viewport`, `markers`, `session`) are plain Rust and run
//! natively under test. `app`, `naver` and `browser` glue them to Seed and
//! the page.

pub mod banner;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod geolocation;
pub mod links;
pub mod map;
pub mod markers;
pub mod pagination;
pub mod script_loader;
pub mod session;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod naver;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    logging::init();
    seed::app::App::start("app", app::init, app::update, app::view);
}
