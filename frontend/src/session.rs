//! State of one visit to the walk route page.
//!
//! [`WalkSession`] merges the asynchronous inputs (tab choice, diagnosis
//! bias, device position, route responses) into one consistent view. It
//! never performs I/O itself: every operation returns the [`Effect`]s the
//! caller has to run, and results are fed back through the matching method.

use std::time::Duration;

use shared::{Coordinate, DiagnosisRecord, RouteItem};

use crate::{
    banner::{BANNER_FADE, BANNER_VISIBLE, Banner, BannerTicket},
    fetch::{FetchStatus, QueryTicket, RouteBatch, RouteFetcher, RouteQuery},
    filter::{EffectiveFilter, EntryBias, FilterResolver, Tab},
    geolocation::{GeoError, LOCATION_SET_MESSAGE},
    pagination::Pagination,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchHistory,
    FetchRoutes { ticket: QueryTicket, query: RouteQuery },
    /// User position or route list changed; markers and viewport follow.
    SyncMap,
    /// Call `banner_fade_due` once `after` has elapsed.
    ScheduleBannerFade { ticket: BannerTicket, after: Duration },
    /// Call `banner_clear_due` once `after` has elapsed.
    ScheduleBannerClear { ticket: BannerTicket, after: Duration },
}

impl Effect {
    fn banner_fade(ticket: BannerTicket) -> Self {
        Effect::ScheduleBannerFade {
            ticket,
            after: BANNER_VISIBLE,
        }
    }

    fn banner_clear(ticket: BannerTicket) -> Self {
        Effect::ScheduleBannerClear {
            ticket,
            after: BANNER_FADE,
        }
    }
}

#[derive(Debug)]
pub struct WalkSession {
    filter: FilterResolver,
    fetcher: RouteFetcher,
    pagination: Pagination,
    routes: Vec<RouteItem>,
    reason: Option<String>,
    last_status: Option<FetchStatus>,
    user_location: Option<Coordinate>,
    location_error: Option<GeoError>,
    banner: Banner,
}

impl WalkSession {
    pub fn new(entry: EntryBias) -> Self {
        Self {
            filter: FilterResolver::new(entry),
            fetcher: RouteFetcher::default(),
            pagination: Pagination::default(),
            routes: Vec::new(),
            reason: None,
            last_status: None,
            user_location: None,
            location_error: None,
            banner: Banner::default(),
        }
    }

    /// First effects after mount: the history lookup when no grade came with
    /// the entry, and the initial route query.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.filter.needs_history() {
            effects.push(Effect::FetchHistory);
        }
        effects.extend(self.requery());
        effects
    }

    pub fn select_tab(&mut self, tab: Tab) -> Option<Effect> {
        self.filter.select_tab(tab);
        self.requery()
    }

    pub fn history_loaded(&mut self, records: &[DiagnosisRecord]) -> Option<Effect> {
        if self.filter.apply_history(records) {
            tracing::info!(grade = ?self.filter.resolved_grade(), "diagnosis history biases routes");
            self.requery()
        } else {
            None
        }
    }

    pub fn routes_loaded(&mut self, ticket: QueryTicket, batch: RouteBatch) -> Option<Effect> {
        if !self.fetcher.accept(ticket) {
            return None;
        }
        if batch.status == FetchStatus::Failed {
            tracing::warn!("route list replaced by an empty result after a failed query");
        }
        self.routes = batch.routes;
        self.reason = batch.reason;
        self.last_status = Some(batch.status);
        self.pagination.reset();
        Some(Effect::SyncMap)
    }

    /// Called when the user asks for their position, before the request runs.
    pub fn location_requested(&mut self) {
        self.location_error = None;
        self.banner.dismiss();
    }

    /// A failed request leaves any previous position in place.
    pub fn location_resolved(&mut self, result: Result<Coordinate, GeoError>) -> Vec<Effect> {
        match result {
            Ok(coord) => {
                self.user_location = Some(coord);
                self.location_error = None;
                let ticket = self.banner.show(LOCATION_SET_MESSAGE);
                let mut effects = vec![Effect::banner_fade(ticket), Effect::SyncMap];
                effects.extend(self.requery());
                effects
            }
            Err(err) => {
                self.location_error = Some(err);
                let ticket = self.banner.show(err.explanation());
                vec![Effect::banner_fade(ticket)]
            }
        }
    }

    pub fn banner_fade_due(&mut self, ticket: BannerTicket) -> Option<Effect> {
        self.banner
            .begin_fade(ticket)
            .then_some(Effect::banner_clear(ticket))
    }

    pub fn banner_clear_due(&mut self, ticket: BannerTicket) {
        self.banner.clear(ticket);
    }

    pub fn reveal_more(&mut self) {
        self.pagination.reveal_more(self.routes.len());
    }

    fn requery(&mut self) -> Option<Effect> {
        let query = RouteQuery::new(self.filter.effective(), self.user_location);
        let ticket = self.fetcher.issue(query)?;
        self.pagination.reset();
        Some(Effect::FetchRoutes { ticket, query })
    }

    pub fn effective_filter(&self) -> EffectiveFilter {
        self.filter.effective()
    }

    pub fn active_tab(&self) -> Tab {
        self.filter.active_tab()
    }

    pub fn is_loading(&self) -> bool {
        self.fetcher.is_pending()
    }

    pub fn routes(&self) -> &[RouteItem] {
        &self.routes
    }

    pub fn visible_routes(&self) -> &[RouteItem] {
        self.pagination.visible(&self.routes)
    }

    pub fn has_more(&self) -> bool {
        self.pagination.has_more(self.routes.len())
    }

    /// Size of the next page offered by the "load more" button.
    pub fn next_page_size(&self) -> usize {
        self.pagination.next_increment(self.routes.len())
    }

    pub fn last_status(&self) -> Option<FetchStatus> {
        self.last_status
    }

    pub fn user_location(&self) -> Option<Coordinate> {
        self.user_location
    }

    pub fn location_error(&self) -> Option<GeoError> {
        self.location_error
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    /// Line shown above the list: the server's reason, or a note about the
    /// known diagnosis grade.
    pub fn headline(&self) -> Option<String> {
        self.reason.clone().or_else(|| {
            self.filter
                .resolved_grade()
                .map(|grade| format!("Routes matched to the recent diagnosis ({}).", grade.as_str()))
        })
    }
}
