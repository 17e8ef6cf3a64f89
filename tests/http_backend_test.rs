mod common;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use batchgate::application::engine::{BatchEngine, EngineConfig};
use batchgate::domain::order::{OrderRequest, OrderResponse, Status};
use batchgate::domain::ports::OrderBackend;
use batchgate::error::OrderError;
use batchgate::infrastructure::http_backend::HttpOrderBackend;
use common::{WAIT, spawn_server};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

/// Approves even prices, rejects odd ones, and records what it received.
fn parity_backend(received: Arc<Mutex<Vec<Vec<OrderRequest>>>>) -> Router {
    Router::new().route(
        "/v1/fulfillorder",
        post(move |headers: HeaderMap, Json(orders): Json<Vec<OrderRequest>>| {
            let received = received.clone();
            async move {
                assert_eq!(headers["content-type"], "application/json");
                received.lock().unwrap().push(orders.clone());
                let responses: Vec<OrderResponse> = orders
                    .into_iter()
                    .map(|o| {
                        let status = if o.price % 2 == 0 {
                            Status::Approved
                        } else {
                            Status::Rejected
                        };
                        OrderResponse::new(o, status)
                    })
                    .collect();
                Json(responses)
            }
        }),
    )
}

#[tokio::test]
async fn test_posts_batch_and_decodes_responses() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_server(parity_backend(received.clone())).await;
    let backend = HttpOrderBackend::new(&base_url, Duration::from_secs(2)).unwrap();
    let orders = vec![OrderRequest::new(2, "even"), OrderRequest::new(3, "odd")];

    let responses = backend.fulfill_orders(&orders).await.unwrap();

    assert_eq!(
        responses,
        vec![
            OrderResponse::new(orders[0].clone(), Status::Approved),
            OrderResponse::new(orders[1].clone(), Status::Rejected),
        ]
    );
    assert_eq!(*received.lock().unwrap(), vec![orders]);
}

#[tokio::test]
async fn test_non_success_status_is_dispatch_error() {
    let router = Router::new().route(
        "/v1/fulfillorder",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base_url = spawn_server(router).await;
    let backend = HttpOrderBackend::new(&base_url, Duration::from_secs(2)).unwrap();

    let result = backend.fulfill_orders(&[OrderRequest::new(1, "a")]).await;

    assert!(matches!(result, Err(OrderError::Dispatch(_))));
}

#[tokio::test]
async fn test_empty_body_is_dispatch_error() {
    let router = Router::new().route("/v1/fulfillorder", post(|| async { StatusCode::OK }));
    let base_url = spawn_server(router).await;
    let backend = HttpOrderBackend::new(&base_url, Duration::from_secs(2)).unwrap();

    let result = backend.fulfill_orders(&[OrderRequest::new(1, "a")]).await;

    assert!(matches!(result, Err(OrderError::Dispatch(_))));
}

#[tokio::test]
async fn test_undecodable_body_is_dispatch_error() {
    let router = Router::new().route("/v1/fulfillorder", post(|| async { "not json" }));
    let base_url = spawn_server(router).await;
    let backend = HttpOrderBackend::new(&base_url, Duration::from_secs(2)).unwrap();

    let result = backend.fulfill_orders(&[OrderRequest::new(1, "a")]).await;

    assert!(matches!(result, Err(OrderError::Dispatch(_))));
}

#[tokio::test]
async fn test_backend_call_timeout_is_dispatch_error() {
    let router = Router::new().route(
        "/v1/fulfillorder",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK
        }),
    );
    let base_url = spawn_server(router).await;
    let backend = HttpOrderBackend::new(&base_url, Duration::from_millis(100)).unwrap();

    let result = backend.fulfill_orders(&[OrderRequest::new(1, "a")]).await;

    assert!(matches!(result, Err(OrderError::Dispatch(_))));
}

#[tokio::test]
async fn test_engine_over_http_failing_backend_fails_batch() {
    let router = Router::new().route(
        "/v1/fulfillorder",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base_url = spawn_server(router).await;
    let backend = HttpOrderBackend::new(&base_url, Duration::from_secs(2)).unwrap();
    let mut engine = BatchEngine::new(EngineConfig::new(2), Arc::new(backend)).unwrap();
    engine.start().unwrap();

    let a = engine.submit(OrderRequest::new(1, "a"));
    let b = engine.submit(OrderRequest::new(2, "b"));

    assert!(matches!(
        timeout(WAIT, a.wait()).await.unwrap(),
        Err(OrderError::Dispatch(_))
    ));
    assert!(matches!(
        timeout(WAIT, b.wait()).await.unwrap(),
        Err(OrderError::Dispatch(_))
    ));
    engine.stop().await;
}

#[tokio::test]
async fn test_engine_over_http_routes_statuses() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_server(parity_backend(received.clone())).await;
    let backend = HttpOrderBackend::new(&base_url, Duration::from_secs(2)).unwrap();
    let mut engine = BatchEngine::new(EngineConfig::new(2), Arc::new(backend)).unwrap();
    engine.start().unwrap();

    let even = engine.submit(OrderRequest::new(10, "even"));
    let odd = engine.submit(OrderRequest::new(11, "odd"));

    assert_eq!(timeout(WAIT, even.wait()).await.unwrap(), Ok(Status::Approved));
    assert_eq!(timeout(WAIT, odd.wait()).await.unwrap(), Ok(Status::Rejected));
    assert_eq!(received.lock().unwrap().len(), 1);
    engine.stop().await;
}
