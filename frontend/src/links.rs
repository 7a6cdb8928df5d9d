//! Outbound links to the Naver map site.

use shared::RouteItem;

const SEARCH_URL: &str = "https://map.naver.com/v5/search/";
const FALLBACK_QUERY: &str = "walking trail";

/// Search term for a route: address and name, else the name alone.
pub fn search_query(route: &RouteItem) -> String {
    let query = [route.address.trim(), route.name.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if query.is_empty() {
        FALLBACK_QUERY.to_string()
    } else {
        query
    }
}

pub fn search_link(route: &RouteItem) -> String {
    format!("{SEARCH_URL}{}", urlencoding::encode(&search_query(route)))
}

pub fn coordinate_link(route: &RouteItem) -> Option<String> {
    let coord = route.coordinate()?;
    Some(format!(
        "https://map.naver.com/v5/?c={},{},15,0,0,0,dh",
        coord.lon, coord.lat
    ))
}

/// Link opened by the "start navigation" button. A route with neither a
/// name nor an address is located by coordinate when it has one.
pub fn navigation_link(route: &RouteItem) -> String {
    let has_text = !route.name.trim().is_empty() || !route.address.trim().is_empty();
    if has_text {
        return search_link(route);
    }
    coordinate_link(route).unwrap_or_else(|| search_link(route))
}
