//! Route query construction and the degrade-to-empty fetch policy.

use futures_util::future::LocalBoxFuture;
use shared::{Coordinate, DiagnosisRecord, RouteItem, WalkRoutesPayload};
use thiserror::Error;

use crate::filter::EffectiveFilter;

pub const DEFAULT_LIMIT: u32 = 80;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Remote collaborators of the route page.
pub trait RouteApi {
    fn walk_routes(
        &self,
        query: &RouteQuery,
    ) -> LocalBoxFuture<'_, Result<WalkRoutesPayload, FetchError>>;

    fn diagnosis_history(&self) -> LocalBoxFuture<'_, Result<Vec<DiagnosisRecord>, FetchError>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub filter: EffectiveFilter,
    pub location: Option<Coordinate>,
    pub limit: u32,
}

impl RouteQuery {
    pub fn new(filter: EffectiveFilter, location: Option<Coordinate>) -> Self {
        Self {
            filter,
            location,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("filter_type", self.filter.filter_type.as_str().to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(location) = self.location {
            pairs.push(("latitude", location.lat.to_string()));
            pairs.push(("longitude", location.lon.to_string()));
        }
        if let Some(category) = self.filter.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(grade) = self.filter.grade {
            pairs.push(("diagnosis_grade", grade.as_str().to_string()));
        }
        pairs
    }

    pub fn url(&self, base: &str) -> String {
        let query = self
            .query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{base}?{query}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Loaded,
    /// The backend answered successfully with no routes.
    Empty,
    /// The request failed; rendered exactly like `Empty`.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteBatch {
    pub routes: Vec<RouteItem>,
    pub reason: Option<String>,
    pub status: FetchStatus,
}

impl RouteBatch {
    pub fn failed() -> Self {
        Self {
            routes: Vec::new(),
            reason: None,
            status: FetchStatus::Failed,
        }
    }

    pub fn from_payload(payload: WalkRoutesPayload) -> Self {
        let (routes, reason) = payload.into_parts();
        let status = if routes.is_empty() {
            FetchStatus::Empty
        } else {
            FetchStatus::Loaded
        };
        Self {
            routes,
            reason,
            status,
        }
    }
}

/// Runs one route query. Failures never propagate: they become an empty
/// batch tagged `Failed`.
pub async fn fetch_routes<A: RouteApi + ?Sized>(api: &A, query: &RouteQuery) -> RouteBatch {
    tracing::debug!(params = ?query.query_pairs(), "requesting walk routes");
    match api.walk_routes(query).await {
        Ok(payload) => {
            let batch = RouteBatch::from_payload(payload);
            tracing::debug!(
                routes = batch.routes.len(),
                recommended = batch.reason.is_some(),
                "walk routes received"
            );
            batch
        }
        Err(err) => {
            tracing::warn!(error = %err, "walk route query failed, showing no routes");
            RouteBatch::failed()
        }
    }
}

/// Diagnosis history with the same policy: any failure reads as no history.
pub async fn fetch_history<A: RouteApi + ?Sized>(api: &A) -> Vec<DiagnosisRecord> {
    match api.diagnosis_history().await {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(error = %err, "diagnosis history unavailable");
            Vec::new()
        }
    }
}

/// Identifies one issued query; only the latest one may update the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryTicket(u64);

#[derive(Debug, Default)]
pub struct RouteFetcher {
    issued: u64,
    last_query: Option<RouteQuery>,
    pending: bool,
}

impl RouteFetcher {
    /// Issues a ticket for `query` unless it is identical to the last one.
    pub fn issue(&mut self, query: RouteQuery) -> Option<QueryTicket> {
        if self.last_query == Some(query) {
            return None;
        }
        self.issued += 1;
        self.last_query = Some(query);
        self.pending = true;
        Some(QueryTicket(self.issued))
    }

    /// Accepts a response if its ticket is still the newest.
    pub fn accept(&mut self, ticket: QueryTicket) -> bool {
        if ticket.0 != self.issued {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                "dropping superseded route response"
            );
            return false;
        }
        self.pending = false;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_query(&self) -> Option<&RouteQuery> {
        self.last_query.as_ref()
    }
}
