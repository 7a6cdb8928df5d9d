use std::rc::Rc;

use seed::{prelude::*, *};
use shared::{Coordinate, RouteItem};

use crate::{
    banner::BannerTicket,
    browser::{self, BrowserGeolocator, HttpRouteApi},
    config::ClientConfig,
    fetch::{QueryTicket, RouteBatch, fetch_history, fetch_routes},
    filter::{EntryBias, Tab},
    geolocation::{GeoError, GeolocationController},
    links,
    map::{MapProvider, MapSession},
    naver::NaverMap,
    script_loader::MapLoadError,
    session::{Effect, WalkSession},
    viewport::initial_options,
};

const MAP_CONTAINER: &str = "walk-map";

pub struct Model {
    session: WalkSession,
    api: Rc<HttpRouteApi>,
    geolocation: GeolocationController<BrowserGeolocator>,
    map: Option<MapSession<NaverMap>>,
    map_error: Option<MapLoadError>,
    banner_timer: Option<CmdHandle>,
}

pub enum Msg {
    MountMap,
    MapLoaded(Result<(), MapLoadError>),
    TabSelected(Tab),
    HistoryLoaded(Vec<shared::DiagnosisRecord>),
    RoutesLoaded(QueryTicket, RouteBatch),
    LocateRequested,
    LocationResolved(Result<Coordinate, GeoError>),
    BannerFade(BannerTicket),
    BannerClear(BannerTicket),
    LoadMore,
    OpenLink(String),
}

fn entry_bias(url: &Url) -> EntryBias {
    let search = url.search();
    let first = |key: &str| {
        search
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    };
    EntryBias::from_pairs(
        ["filter_type", "grade", "diagnosis_grade"]
            .into_iter()
            .filter_map(|key| first(key).map(|value| (key, value))),
    )
}

pub fn init(url: Url, orders: &mut impl Orders<Msg>) -> Model {
    let config = ClientConfig::from_build_env();
    let bias = entry_bias(&url);
    tracing::info!(api_root = %config.api_root, ?bias, "walk route page starting");

    let mut model = Model {
        session: WalkSession::new(bias),
        api: Rc::new(HttpRouteApi::new(config)),
        geolocation: GeolocationController::new(BrowserGeolocator::detect()),
        map: None,
        map_error: None,
        banner_timer: None,
    };

    let effects = model.session.start();
    run_effects(effects, &mut model, orders);

    // The container has to be in the DOM before the SDK draws into it.
    orders.after_next_render(|_| Msg::MountMap);

    model
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::MountMap => {
            let provider = NaverMap::new(MAP_CONTAINER);
            orders.perform_cmd(async move { Msg::MapLoaded(provider.load().await) });
        }
        Msg::MapLoaded(Ok(())) => {
            if model.map.is_some() {
                return;
            }
            let options = initial_options(model.session.user_location(), model.session.routes());
            let mut map = MapSession::mount(Rc::new(NaverMap::new(MAP_CONTAINER)), &options);
            map.refresh(model.session.user_location(), model.session.routes());
            model.map = Some(map);
            model.map_error = None;
        }
        Msg::MapLoaded(Err(err)) => {
            tracing::warn!(error = %err, "map unavailable");
            model.map_error = Some(err);
        }
        Msg::TabSelected(tab) => {
            let effects = model.session.select_tab(tab);
            run_effects(effects, model, orders);
        }
        Msg::HistoryLoaded(records) => {
            let effects = model.session.history_loaded(&records);
            run_effects(effects, model, orders);
        }
        Msg::RoutesLoaded(ticket, batch) => {
            let effects = model.session.routes_loaded(ticket, batch);
            run_effects(effects, model, orders);
        }
        Msg::LocateRequested => {
            if model.geolocation.is_locating() {
                return;
            }
            model.session.location_requested();
            model.banner_timer = None;
            match model.geolocation.begin() {
                Ok(request) => {
                    orders.perform_cmd(async move { Msg::LocationResolved(request.await) });
                }
                Err(err) => {
                    orders.send_msg(Msg::LocationResolved(Err(err)));
                }
            }
        }
        Msg::LocationResolved(result) => {
            model.geolocation.finish(&result);
            let effects = model.session.location_resolved(result);
            run_effects(effects, model, orders);
        }
        Msg::BannerFade(ticket) => {
            let effects = model.session.banner_fade_due(ticket);
            run_effects(effects, model, orders);
        }
        Msg::BannerClear(ticket) => {
            model.session.banner_clear_due(ticket);
            model.banner_timer = None;
        }
        Msg::LoadMore => model.session.reveal_more(),
        Msg::OpenLink(url) => {
            browser::open_external(&url);
            orders.skip();
        }
    }
}

fn run_effects(
    effects: impl IntoIterator<Item = Effect>,
    model: &mut Model,
    orders: &mut impl Orders<Msg>,
) {
    for effect in effects {
        match effect {
            Effect::FetchHistory => {
                let api = Rc::clone(&model.api);
                orders.perform_cmd(async move { Msg::HistoryLoaded(fetch_history(&*api).await) });
            }
            Effect::FetchRoutes { ticket, query } => {
                let api = Rc::clone(&model.api);
                orders.perform_cmd(async move {
                    Msg::RoutesLoaded(ticket, fetch_routes(&*api, &query).await)
                });
            }
            Effect::SyncMap => {
                if let Some(map) = model.map.as_mut() {
                    map.refresh(model.session.user_location(), model.session.routes());
                }
            }
            Effect::ScheduleBannerFade { ticket, after } => {
                // Replacing the handle aborts the previous banner's timer.
                model.banner_timer = Some(orders.perform_cmd_with_handle(cmds::timeout(
                    after.as_millis() as u32,
                    move || Msg::BannerFade(ticket),
                )));
            }
            Effect::ScheduleBannerClear { ticket, after } => {
                model.banner_timer = Some(orders.perform_cmd_with_handle(cmds::timeout(
                    after.as_millis() as u32,
                    move || Msg::BannerClear(ticket),
                )));
            }
        }
    }
}

pub fn view(model: &Model) -> Node<Msg> {
    div![
        C!["walk-page"],
        h1!["Walking routes"],
        view_headline(model),
        view_tabs(model),
        view_location(model),
        view_map(model),
        view_routes(model),
    ]
}

fn view_headline(model: &Model) -> Node<Msg> {
    match model.session.headline() {
        Some(headline) => p![C!["headline"], headline],
        None => empty![],
    }
}

fn view_tabs(model: &Model) -> Node<Msg> {
    let active = model.session.active_tab();
    nav![
        C!["filter-tabs"],
        Tab::ALL.iter().map(|&tab| {
            button![
                C!["filter-tab", IF!(tab == active => "active")],
                tab.label(),
                IF!(tab.recommended() => span![C!["badge"], "Recommended"]),
                ev(Ev::Click, move |_| Msg::TabSelected(tab)),
            ]
        }),
    ]
}

fn view_location(model: &Model) -> Node<Msg> {
    let locating = model.geolocation.is_locating();
    div![
        C!["location"],
        button![
            if locating {
                "Finding your location…"
            } else {
                "📍 Use my location"
            },
            attrs! { At::Disabled => locating.as_at_value() },
            ev(Ev::Click, |_| Msg::LocateRequested),
        ],
        match model.session.location_error() {
            Some(err) => small![C!["error"], err.explanation()],
            None => empty![],
        },
    ]
}

fn view_map(model: &Model) -> Node<Msg> {
    let banner = model.session.banner();
    div![
        C!["map-frame"],
        div![id![MAP_CONTAINER], C!["map"]],
        match model.map_error {
            Some(err) => div![C!["map-error"], err.explanation()],
            None => empty![],
        },
        match banner.message() {
            Some(message) => div![
                C!["banner", IF!(banner.is_fading() => "fading")],
                message
            ],
            None => empty![],
        },
    ]
}

fn view_routes(model: &Model) -> Node<Msg> {
    let session = &model.session;
    let visible = session.visible_routes();
    let caption = format!(
        "Walking routes ({} shown / {} total)",
        visible.len(),
        session.routes().len()
    );

    let body = if visible.is_empty() {
        let text = if session.is_loading() {
            "Loading routes…"
        } else {
            "No routes match this filter."
        };
        vec![p![C!["empty"], text]]
    } else {
        visible.iter().map(view_card).collect()
    };

    section![
        C!["route-list"],
        h2![caption],
        body,
        IF!(session.has_more() => button![
            C!["load-more"],
            format!("Load more (+{})", session.next_page_size()),
            ev(Ev::Click, |_| Msg::LoadMore),
        ]),
    ]
}

fn view_card(route: &RouteItem) -> Node<Msg> {
    let link = links::navigation_link(route);
    let facts = [
        Some(route.difficulty.clone()).filter(|d| !d.is_empty()),
        route.distance.clone(),
        route.duration.clone(),
        route
            .distance_from_user_km
            .map(|km| format!("{km:.2} km away")),
    ];

    div![
        C!["route-card"],
        div![
            C!["route-card-head"],
            strong![&route.name],
            span![C!["source"], route.source.label()],
            IF!(!route.region.is_empty() => span![C!["region"], &route.region]),
        ],
        ul![
            C!["tags"],
            route.tags.iter().map(|tag| li![C!["tag"], tag])
        ],
        p![
            C!["facts"],
            facts.into_iter().flatten().collect::<Vec<_>>().join(" · ")
        ],
        IF!(!route.description.is_empty() => p![C!["description"], &route.description]),
        button![
            C!["open-map"],
            "Open in Naver Map",
            ev(Ev::Click, move |_| Msg::OpenLink(link.clone())),
        ],
    ]
}
