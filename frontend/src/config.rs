//! Build-time client configuration.
//!
//! Values are baked in with `option_env!` when the wasm bundle is built, the
//! same way the API root always has been.

const DEFAULT_API_ROOT: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the routes backend, without trailing slash.
    pub api_root: String,
    /// Naver Maps client id; `None` disables the map entirely.
    pub map_client_id: Option<String>,
}

impl ClientConfig {
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("FRONTEND_API_ROOT"),
            option_env!("NAVER_MAP_CLIENT_ID"),
        )
    }

    pub fn from_values(api_root: Option<&str>, map_client_id: Option<&str>) -> Self {
        let api_root = api_root
            .map(str::trim)
            .filter(|root| !root.is_empty())
            .unwrap_or(DEFAULT_API_ROOT)
            .trim_end_matches('/')
            .to_string();
        let map_client_id = map_client_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Self {
            api_root,
            map_client_id,
        }
    }

    pub fn walk_routes_url(&self) -> String {
        format!("{}/api/walk-routes", self.api_root)
    }

    pub fn diagnosis_history_url(&self) -> String {
        format!("{}/api/diagnosis-history", self.api_root)
    }
}
