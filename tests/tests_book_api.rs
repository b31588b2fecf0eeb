use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use bookfeed::api::{create_app, AppState};
use bookfeed::book_service::BookService;
use bookfeed::db::OrderStore;
use bookfeed::models::{Order, Side};

/// Mock store that records how it is queried, so the tests can assert
/// both the response body and what reached the store boundary.
struct MockStore {
    orders: Arc<Mutex<Vec<Order>>>,
    calls: Arc<AtomicUsize>,
    last_limit: Arc<AtomicI32>,
}

impl MockStore {
    fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
            calls: Arc::new(AtomicUsize::new(0)),
            last_limit: Arc::new(AtomicI32::new(-1)),
        }
    }
}

impl OrderStore for MockStore {
    fn insert_order(&self, order: Order) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        let orders = self.orders.clone();
        Box::pin(async move {
            orders.lock().unwrap().push(order);
            Ok(())
        })
    }

    fn top_of_book(
        &self,
        symbol: String,
        side: Side,
        limit: i32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<(f64, f64)>>> + Send>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);

        let orders = self.orders.clone();
        Box::pin(async move {
            let mut levels: Vec<(f64, f64)> = orders
                .lock()
                .unwrap()
                .iter()
                .filter(|order| order.symbol == symbol && order.side == side)
                .map(|order| (order.price, order.amount))
                .collect();
            match side {
                Side::Buy => levels.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap()),
                Side::Sell => levels.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap()),
            }
            levels.truncate(limit as usize);
            Ok(levels)
        })
    }
}

fn order(order_id: &str, side: Side, symbol: &str, amount: f64, price: f64) -> Order {
    Order {
        order_id: order_id.to_string(),
        side,
        symbol: symbol.to_string(),
        amount,
        price,
    }
}

fn app_with(orders: Vec<Order>) -> (axum::Router, Arc<MockStore>) {
    let store = Arc::new(MockStore::new(orders));
    let state = Arc::new(AppState {
        book: BookService::new(store.clone()),
    });
    (create_app(state), store)
}

fn orders_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_home_page() {
    let (app, _store) = app_with(vec![]);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_json = response_json(response).await;
    assert_eq!(body_json["msg"], "home page");
}

#[tokio::test]
async fn test_book_snapshot_for_seeded_symbol() {
    let (app, _store) = app_with(vec![
        order("1", Side::Buy, "AAPL", 10.0, 150.0),
        order("2", Side::Sell, "AAPL", 5.0, 2700.0),
    ]);

    let response = app
        .oneshot(orders_request("symbol=AAPL&limit=100"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_json = response_json(response).await;
    assert_eq!(
        body_json,
        serde_json::json!({
            "bids": [["150.00", "10.00"]],
            "asks": [["2700.00", "5.00"]],
        })
    );
}

#[tokio::test]
async fn test_unknown_symbol_yields_empty_book() {
    let (app, _store) = app_with(vec![order("1", Side::Buy, "AAPL", 10.0, 150.0)]);

    let response = app
        .oneshot(orders_request("symbol=UNKNOWN&limit=100"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_json = response_json(response).await;
    assert_eq!(body_json, serde_json::json!({"bids": [], "asks": []}));
}

#[tokio::test]
async fn test_invalid_limit_is_client_error_without_store_call() {
    let (app, store) = app_with(vec![order("1", Side::Buy, "AAPL", 10.0, 150.0)]);

    let response = app
        .oneshot(orders_request("symbol=AAPL&limit=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_json = response_json(response).await;
    assert_eq!(body_json["error"], "Invalid limit");
    assert_eq!(
        store.calls.load(Ordering::SeqCst),
        0,
        "No store query may run for an invalid limit"
    );
}

#[tokio::test]
async fn test_limit_defaults_to_100() {
    let (app, store) = app_with(vec![]);

    let response = app.oneshot(orders_request("symbol=AAPL")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.last_limit.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn test_limit_above_cap_is_clamped() {
    let (app, store) = app_with(vec![]);

    let response = app
        .oneshot(orders_request("symbol=AAPL&limit=5000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store.last_limit.load(Ordering::SeqCst),
        1000,
        "limit=5000 must behave exactly like limit=1000"
    );
}

#[tokio::test]
async fn test_bids_descend_and_asks_ascend() {
    let (app, _store) = app_with(vec![
        order("1", Side::Buy, "AAPL", 10.0, 150.0),
        order("5", Side::Buy, "AAPL", 10.0, 3200.0),
        order("9", Side::Buy, "AAPL", 10.0, 200.0),
        order("2", Side::Sell, "AAPL", 5.0, 2700.0),
        order("6", Side::Sell, "AAPL", 10.0, 300.0),
        order("10", Side::Sell, "AAPL", 10.0, 50.0),
    ]);

    let response = app
        .oneshot(orders_request("symbol=AAPL&limit=100"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_json = response_json(response).await;

    let bid_prices: Vec<f64> = body_json["bids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|level| level[0].as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(bid_prices, vec![3200.0, 200.0, 150.0]);

    let ask_prices: Vec<f64> = body_json["asks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|level| level[0].as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(ask_prices, vec![50.0, 300.0, 2700.0]);
}

#[tokio::test]
async fn test_missing_symbol_yields_empty_book() {
    let (app, _store) = app_with(vec![order("1", Side::Buy, "AAPL", 10.0, 150.0)]);

    let response = app.oneshot(orders_request("limit=10")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_json = response_json(response).await;
    assert_eq!(body_json, serde_json::json!({"bids": [], "asks": []}));
}
