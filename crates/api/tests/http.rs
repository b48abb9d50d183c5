use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use api::{build_router, AppState};
use store::mock::InMemoryStore;
use store::{Ad, AdStatus, Category, RecordStore, Role, User};

const ADMIN: i64 = 1;
const REQUESTER: i64 = 3;
const AIRLINE: i64 = 4;

fn ad(id: i64, price: i64, category_id: i64, plane_age: i32) -> Ad {
    Ad {
        id,
        user_id: AIRLINE,
        category_id,
        price,
        status: AdStatus::Active,
        fly_time: 1000,
        airplane_model: "XYZ123".into(),
        repair_check: false,
        expert_check: false,
        plane_age,
        subject: format!("Example Ad {id}"),
        description: String::new(),
        image: format!("example{id}.jpg"),
        created_at: Utc::now(),
    }
}

fn store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.add_user(User { id: ADMIN, role: Role::Admin });
    store.add_user(User { id: REQUESTER, role: Role::Buyer });
    store.add_user(User { id: AIRLINE, role: Role::Airline });
    store.add_category(Category { id: 1, name: "small-passenger".into() });
    store.add_category(Category { id: 2, name: "cargo".into() });
    store.add_ad(ad(1, 500_000, 1, 7));
    store.add_ad(ad(2, 1000, 2, 12));
    store.add_ad(ad(7, 1000, 2, 3));
    store
}

fn app(store: &Arc<InMemoryStore>) -> axum::Router {
    build_router(AppState::new(store.clone() as Arc<dyn RecordStore>))
}

/// Send a request and return (status, parsed JSON body or `Null`).
async fn send(
    store: &Arc<InMemoryStore>,
    method: &str,
    uri: &str,
    user: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app(store).oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|ad| ad["id"].as_i64().unwrap())
        .collect()
}

// ============================================================
// ads
// ============================================================

#[tokio::test]
async fn list_without_params_returns_everything() {
    let store = store();
    let (status, body) = send(&store, "GET", "/ads", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 7]);
}

#[tokio::test]
async fn list_filters_by_columns() {
    let store = store();
    let (_, body) = send(&store, "GET", "/ads?plane_age=7", None, None).await;
    assert_eq!(ids(&body), vec![1]);

    let (_, body) = send(&store, "GET", "/ads?category_id=2&price=1000", None, None).await;
    assert_eq!(ids(&body), vec![2, 7]);
}

#[tokio::test]
async fn list_sort_ignores_filters() {
    let store = store();
    let (status, body) =
        send(&store, "GET", "/ads?category_id=1&sort=price,asc&sort=plane_age,desc", None, None)
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2, 7, 1]);
}

#[tokio::test]
async fn list_sort_by_unknown_column_is_rejected() {
    let store = store();
    let (status, body) = send(
        &store,
        "GET",
        "/ads?sort=plane_age,asc&sort=favourite_colour,desc",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("favourite_colour"));
}

#[tokio::test]
async fn get_ad_by_id() {
    let store = store();
    let (status, body) = send(&store, "GET", "/ads/2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 1000);

    let (status, _) = send(&store, "GET", "/ads/99", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn airline_creates_an_ad() {
    let store = store();
    let draft = json!({
        "category": "small-passenger",
        "price": 500000,
        "fly_time": 1000,
        "model": "XYZ123",
        "repair_check": false,
        "expert_check": false,
        "age": 7,
        "subject": "Example Ad 1",
        "image": "example1.jpg"
    });

    let (status, body) = send(&store, "POST", "/ads", Some(AIRLINE), Some(draft.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], AIRLINE);
    assert_eq!(body["status"], "active");

    let (status, _) = send(&store, "POST", "/ads", Some(REQUESTER), Some(draft.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&store, "POST", "/ads", None, Some(draft)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ad_older_than_first_flight_is_rejected() {
    let store = store();
    let draft = json!({
        "category": "small-passenger",
        "price": 500000,
        "fly_time": 1000,
        "model": "XYZ123",
        "age": 1000
    });
    let (status, body) = send(&store, "POST", "/ads", Some(AIRLINE), Some(draft)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("1903"));
}

// ============================================================
// repair requests
// ============================================================

#[tokio::test]
async fn repair_request_lifecycle() {
    let store = store();

    let (status, created) =
        send(&store, "POST", "/ads/7/repair-request", Some(REQUESTER), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "wait_for_payment");
    let request_id = created["id"].as_i64().unwrap();

    let (status, _) = send(&store, "POST", "/ads/7/repair-request", Some(REQUESTER), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let advance = format!("/repair-requests/{request_id}");
    let (status, _) = send(
        &store,
        "PATCH",
        &advance,
        Some(REQUESTER),
        Some(json!({ "status": "matin_pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &store,
        "PATCH",
        &advance,
        Some(ADMIN),
        Some(json!({ "status": "wait_for_payment" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &store,
        "PATCH",
        &advance,
        Some(ADMIN),
        Some(json!({ "status": "matin_pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "matin_pending");

    let (status, _) = send(&store, "POST", "/ads/7/repair-request", Some(REQUESTER), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&store, "DELETE", "/ads/7/repair-request", Some(REQUESTER), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(store.repair_requests().len(), 1);
}

#[tokio::test]
async fn waiting_request_can_be_cancelled() {
    let store = store();
    send(&store, "POST", "/ads/7/repair-request", Some(REQUESTER), None).await;

    let (status, _) = send(&store, "DELETE", "/ads/7/repair-request", Some(REQUESTER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(store.repair_requests().is_empty());

    let (status, _) = send(&store, "DELETE", "/ads/7/repair-request", Some(REQUESTER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookup_and_listing_respect_roles() {
    let store = store();
    store.add_user(User { id: 5, role: Role::Airline });
    send(&store, "POST", "/ads/7/repair-request", Some(REQUESTER), None).await;

    let (status, body) = send(&store, "GET", "/ads/7/repair-request", Some(AIRLINE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], REQUESTER);

    let (status, _) = send(&store, "GET", "/ads/7/repair-request", Some(5), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&store, "GET", "/repair-requests", Some(ADMIN), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&store, "GET", "/repair-requests?status=matin_pending", Some(ADMIN), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn store_outage_is_a_server_error() {
    let store = store();
    store.set_unavailable(true);
    let (status, body) = send(&store, "GET", "/ads", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
}

// ============================================================
// malformed requests
// ============================================================

fn assert_json_error(status: StatusCode, body: &Value, expected: StatusCode) {
    assert_eq!(status, expected);
    assert_eq!(body["status"], expected.as_u16());
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_ad_id_is_a_json_bad_request() {
    let store = store();
    let (status, body) = send(&store, "GET", "/ads/abc", None, None).await;
    assert_json_error(status, &body, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ad_without_price_is_a_json_unprocessable_entity() {
    let store = store();
    let draft = json!({
        "category": "small-passenger",
        "fly_time": 1000,
        "model": "XYZ123",
        "age": 7
    });
    let (status, body) = send(&store, "POST", "/ads", Some(AIRLINE), Some(draft)).await;
    assert_json_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("price"));
}

#[tokio::test]
async fn unknown_repair_status_is_a_json_unprocessable_entity() {
    let store = store();
    let (status, body) = send(
        &store,
        "PATCH",
        "/repair-requests/1",
        Some(ADMIN),
        Some(json!({ "status": "bogus" })),
    )
    .await;
    assert_json_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_status_filter_is_a_json_bad_request() {
    let store = store();
    let (status, body) =
        send(&store, "GET", "/repair-requests?status=bogus", Some(ADMIN), None).await;
    assert_json_error(status, &body, StatusCode::BAD_REQUEST);
}
