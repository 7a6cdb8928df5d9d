//! Viewport selection from the user position and the leading routes.

use shared::{Coordinate, RouteBounds, RouteItem};

use crate::map::MapOptions;

/// Zoom at which roughly a 2 km radius is visible.
pub const CLOSE_IN_ZOOM: u8 = 14;
pub const DEFAULT_ZOOM: u8 = 13;
/// Seoul city center.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 37.5665,
    lon: 126.978,
};
pub const FIT_PADDING_PX: u32 = 24;
/// Only the first few geolocated routes shape the viewport.
pub const FRAMED_ROUTES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportMode {
    LockToUser,
    CenterOnPoint,
    FitBounds,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportPlan {
    LockToUser { center: Coordinate, zoom: u8 },
    CenterOnPoint { center: Coordinate, zoom: u8 },
    FitBounds { bounds: RouteBounds, padding: u32 },
    Fallback { center: Coordinate, zoom: u8 },
}

impl ViewportPlan {
    pub fn mode(&self) -> ViewportMode {
        match self {
            ViewportPlan::LockToUser { .. } => ViewportMode::LockToUser,
            ViewportPlan::CenterOnPoint { .. } => ViewportMode::CenterOnPoint,
            ViewportPlan::FitBounds { .. } => ViewportMode::FitBounds,
            ViewportPlan::Fallback { .. } => ViewportMode::Fallback,
        }
    }
}

/// User position followed by the first [`FRAMED_ROUTES`] routes that have a
/// usable coordinate, without duplicates.
pub fn framed_points(user: Option<Coordinate>, routes: &[RouteItem]) -> Vec<Coordinate> {
    let mut points: Vec<Coordinate> = Vec::with_capacity(FRAMED_ROUTES + 1);
    let candidates = user.into_iter().chain(
        routes
            .iter()
            .filter_map(RouteItem::coordinate)
            .take(FRAMED_ROUTES),
    );
    for point in candidates {
        if !points.contains(&point) {
            points.push(point);
        }
    }
    points
}

pub fn plan_viewport(user: Option<Coordinate>, routes: &[RouteItem]) -> ViewportPlan {
    plan_for_points(user, &framed_points(user, routes))
}

fn plan_for_points(user: Option<Coordinate>, points: &[Coordinate]) -> ViewportPlan {
    match (user, points) {
        (Some(center), [] | [_]) => ViewportPlan::LockToUser {
            center,
            zoom: CLOSE_IN_ZOOM,
        },
        (None, [center]) => ViewportPlan::CenterOnPoint {
            center: *center,
            zoom: CLOSE_IN_ZOOM,
        },
        (_, []) => ViewportPlan::Fallback {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        },
        (_, points) => match RouteBounds::enclosing(points) {
            Some(bounds) => ViewportPlan::FitBounds {
                bounds,
                padding: FIT_PADDING_PX,
            },
            None => ViewportPlan::Fallback {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
        },
    }
}

/// Options the map is created with before the first plan is applied.
pub fn initial_options(user: Option<Coordinate>, routes: &[RouteItem]) -> MapOptions {
    match user {
        Some(center) => MapOptions {
            center,
            zoom: CLOSE_IN_ZOOM,
        },
        None => MapOptions {
            center: routes
                .iter()
                .find_map(RouteItem::coordinate)
                .unwrap_or(DEFAULT_CENTER),
            zoom: DEFAULT_ZOOM,
        },
    }
}

/// Recomputes the plan only when its inputs change, so that a user's own
/// pan and zoom survive unrelated refreshes.
#[derive(Debug, Default)]
pub struct ViewportController {
    last_inputs: Option<(Option<Coordinate>, Vec<Coordinate>)>,
}

impl ViewportController {
    pub fn update(&mut self, user: Option<Coordinate>, routes: &[RouteItem]) -> Option<ViewportPlan> {
        let points = framed_points(user, routes);
        let inputs = (user, points);
        if self.last_inputs.as_ref() == Some(&inputs) {
            return None;
        }
        let plan = plan_for_points(inputs.0, &inputs.1);
        tracing::debug!(mode = ?plan.mode(), points = inputs.1.len(), "viewport recomputed");
        self.last_inputs = Some(inputs);
        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared::RouteSource;

    fn route(id: usize, coord: Option<(f64, f64)>) -> RouteItem {
        RouteItem {
            id: format!("r{id}"),
            name: format!("Route {id}"),
            region: String::new(),
            difficulty: String::new(),
            distance: None,
            duration: None,
            description: String::new(),
            address: String::new(),
            lat: coord.map(|c| c.0),
            lon: coord.map(|c| c.1),
            source: RouteSource::Walk,
            distance_from_user_km: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn no_points_falls_back_to_city_center() {
        let plan = plan_viewport(None, &[route(0, None)]);
        assert_eq!(
            plan,
            ViewportPlan::Fallback {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM
            }
        );
    }

    #[test]
    fn lone_user_is_centered_close_in() {
        let user = Coordinate::new(37.5, 127.03);
        assert_eq!(
            plan_viewport(Some(user), &[]),
            ViewportPlan::LockToUser {
                center: user,
                zoom: CLOSE_IN_ZOOM
            }
        );
    }

    #[test]
    fn lone_route_is_centered_close_in() {
        let plan = plan_viewport(None, &[route(0, None), route(1, Some((37.6, 127.1)))]);
        assert_eq!(
            plan,
            ViewportPlan::CenterOnPoint {
                center: Coordinate::new(37.6, 127.1),
                zoom: CLOSE_IN_ZOOM
            }
        );
    }

    #[test]
    fn user_plus_routes_fit_only_the_first_three() {
        let user = Coordinate::new(37.50, 127.03);
        let routes: Vec<_> = [
            (37.51, 127.04),
            (37.49, 127.02),
            (37.52, 127.05),
            (38.00, 128.00),
            (36.00, 126.00),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, c)| route(i, Some(c)))
        .collect();

        let ViewportPlan::FitBounds { bounds, padding } = plan_viewport(Some(user), &routes) else {
            panic!("expected a bounding-box fit");
        };
        assert_eq!(padding, FIT_PADDING_PX);
        assert_eq!(bounds.south_west(), Coordinate::new(37.49, 127.02));
        assert_eq!(bounds.north_east(), Coordinate::new(37.52, 127.05));
        assert!(!bounds.contains(Coordinate::new(38.0, 128.0)));
    }

    #[test]
    fn routes_without_coordinates_are_skipped_when_framing() {
        let routes = vec![
            route(0, None),
            route(1, Some((37.51, 127.0))),
            route(2, Some((f64::NAN, 127.0))),
            route(3, Some((37.53, 127.02))),
        ];
        let points = framed_points(None, &routes);
        assert_eq!(
            points,
            vec![Coordinate::new(37.51, 127.0), Coordinate::new(37.53, 127.02)]
        );
    }

    #[test]
    fn user_on_top_of_route_counts_once() {
        let user = Coordinate::new(37.5, 127.0);
        let plan = plan_viewport(Some(user), &[route(0, Some((37.5, 127.0)))]);
        assert_eq!(plan.mode(), ViewportMode::LockToUser);
    }

    #[test]
    fn initial_options_prefer_user_then_first_route() {
        let user = Coordinate::new(37.5, 127.0);
        let routes = vec![route(0, None), route(1, Some((37.6, 127.1)))];
        assert_eq!(
            initial_options(Some(user), &routes),
            MapOptions {
                center: user,
                zoom: CLOSE_IN_ZOOM
            }
        );
        assert_eq!(
            initial_options(None, &routes).center,
            Coordinate::new(37.6, 127.1)
        );
        assert_eq!(initial_options(None, &[]).center, DEFAULT_CENTER);
    }

    #[test]
    fn controller_only_emits_on_change() {
        let mut controller = ViewportController::default();
        let routes = vec![route(0, Some((37.6, 127.1)))];
        assert!(controller.update(None, &routes).is_some());
        assert!(controller.update(None, &routes).is_none());
        assert_eq!(
            controller
                .update(Some(Coordinate::new(37.5, 127.0)), &routes)
                .map(|p| p.mode()),
            Some(ViewportMode::FitBounds)
        );
    }

    fn coord_strategy() -> impl Strategy<Value = Option<(f64, f64)>> {
        prop::option::of((33.0f64..39.0, 124.0f64..132.0))
    }

    proptest! {
        #[test]
        fn prop_mode_follows_point_count(
            user in prop::option::of((33.0f64..39.0, 124.0f64..132.0)),
            coords in prop::collection::vec(coord_strategy(), 0..8),
        ) {
            let user = user.map(|(lat, lon)| Coordinate::new(lat, lon));
            let routes: Vec<_> = coords.into_iter().enumerate().map(|(i, c)| route(i, c)).collect();
            let count = framed_points(user, &routes).len();
            let mode = plan_viewport(user, &routes).mode();
            let expected = match (user.is_some(), count) {
                (_, 0) => ViewportMode::Fallback,
                (true, 1) => ViewportMode::LockToUser,
                (false, 1) => ViewportMode::CenterOnPoint,
                _ => ViewportMode::FitBounds,
            };
            prop_assert_eq!(mode, expected);
        }
    }
}
