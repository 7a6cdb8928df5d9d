use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use backend::{AppState, catalog::Catalog, create_router};
use hyper::StatusCode;
use shared::{ApiError, WalkRoutesPayload};
use tower::ServiceExt;

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.json");

fn test_app() -> axum::Router {
    let catalog = Catalog::from_reader(SAMPLE_CATALOG.as_bytes()).expect("catalog");
    create_router(AppState::new(catalog))
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, bytes.to_vec())
}

async fn payload(uri: &str) -> WalkRoutesPayload {
    let (status, bytes) = get(uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn default_listing_excludes_hard_courses() {
    let WalkRoutesPayload::Plain(routes) = payload("/api/walk-routes").await else {
        panic!("expected a plain listing");
    };
    assert_eq!(routes.len(), 6);
    assert!(routes.iter().all(|r| r.difficulty != "어려움"));
    assert!(routes.iter().all(|r| !r.tags.is_empty()));
    assert!(routes.iter().all(|r| r.distance_from_user_km.is_none()));
    assert!(routes.iter().all(|r| r.coordinate().is_some()));
}

#[tokio::test]
async fn easy_flat_listing() {
    let WalkRoutesPayload::Plain(routes) =
        payload("/api/walk-routes?filter_type=easy&category=flat&limit=80").await
    else {
        panic!("expected a plain listing");
    };
    let names: Vec<_> = routes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["서울숲", "덕수궁 어린이공원", "청계천 산책로"]);
    assert!(routes.iter().all(|r| r.tags.contains(&"평지".to_string())));
}

#[tokio::test]
async fn location_sorts_by_distance() {
    let WalkRoutesPayload::Plain(routes) =
        payload("/api/walk-routes?latitude=37.5665&longitude=126.978&limit=2").await
    else {
        panic!("expected a plain listing");
    };
    let names: Vec<_> = routes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["덕수궁 어린이공원", "청계천 산책로"]);
    let first = routes[0].distance_from_user_km.unwrap();
    let second = routes[1].distance_from_user_km.unwrap();
    assert!(first <= second);
    assert!(second < 1.0);
}

#[tokio::test]
async fn grade_returns_recommendation_with_reason() {
    let uri = format!(
        "/api/walk-routes?diagnosis_grade={}&limit=3",
        urlencoding::encode("3기")
    );
    let WalkRoutesPayload::Recommended {
        recommendation_reason,
        routes,
    } = payload(&uri).await
    else {
        panic!("expected a recommendation");
    };
    assert!(!recommendation_reason.is_empty());
    assert_eq!(routes[0].name, "덕수궁 어린이공원");
    assert!(routes.iter().all(|r| r.difficulty == "쉬움"));
    assert!(routes.iter().all(|r| r.distance_from_user_km.is_some()));
}

#[tokio::test]
async fn unknown_grade_falls_back_to_listing() {
    let uri = format!("/api/walk-routes?diagnosis_grade={}", urlencoding::encode("2기"));
    assert!(matches!(payload(&uri).await, WalkRoutesPayload::Plain(_)));
}

#[tokio::test]
async fn malformed_query_is_rejected_with_message() {
    let (status, bytes) = get("/api/walk-routes?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(!error.message.is_empty());
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/walk-routes")
        .header("origin", "http://localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
