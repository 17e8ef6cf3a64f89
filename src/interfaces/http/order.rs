use super::{ApiError, GatewayState};
use crate::domain::order::{OrderRequest, OrderResponse};
use axum::{Json, body::Bytes, extract::State};
use tokio::time::timeout;
use tracing::warn;

/// Submits the order and races its verdict against the request timeout.
///
/// On timeout the handle is dropped; the engine still resolves the order but
/// nobody is listening.
pub async fn post_order(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = parse_order(&body)?;
    let handle = state.submitter.submit(order.clone());

    match timeout(state.request_timeout, handle.wait()).await {
        Ok(Ok(status)) => Ok(Json(OrderResponse::new(order, status))),
        Ok(Err(e)) => Err(ApiError::Internal(format!("can't process order: {e}"))),
        Err(_) => {
            warn!(
                price = order.price,
                order = %order.order,
                timeout = ?state.request_timeout,
                "order request timed out"
            );
            Err(ApiError::Timeout)
        }
    }
}

pub fn parse_order(body: &[u8]) -> Result<OrderRequest, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("must provide body".to_string()));
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid order body: {e}")))
}
