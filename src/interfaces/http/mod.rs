//! HTTP front end of the gateway.
//!
//! `POST /v1/order` is guarded by Basic Authentication and waits for the
//! engine's verdict up to the configured request timeout. `GET /liveness`
//! is open.

pub mod auth;
pub mod order;

use crate::domain::ports::OrderSubmitterRef;
use auth::Credentials;
use axum::{
    Router,
    http::{StatusCode, header::WWW_AUTHENTICATE},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Shared state for gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub submitter: OrderSubmitterRef,
    pub credentials: Arc<Credentials>,
    pub request_timeout: Duration,
}

impl GatewayState {
    pub fn new(
        submitter: OrderSubmitterRef,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Self {
        Self {
            submitter,
            credentials: Arc::new(credentials),
            request_timeout,
        }
    }
}

/// Request-level failures and the status codes they map to.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("missing or invalid credentials")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("request timed out")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, "Basic realm=\"orders\"")],
            )
                .into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT.into_response(),
            ApiError::Internal(message) => {
                error!(error = %message, "server error");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Builds the gateway router. Authentication only wraps the order route.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/order", post(order::post_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::basic_auth,
        ))
        .route("/liveness", get(liveness))
        .with_state(state)
}

async fn liveness() -> StatusCode {
    StatusCode::OK
}
