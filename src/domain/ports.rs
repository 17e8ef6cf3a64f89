use super::completion::CompletionHandle;
use super::order::{OrderRequest, OrderResponse};
use crate::error::OrderError;
use async_trait::async_trait;
use std::sync::Arc;

/// Evaluates a whole batch of orders in one call.
///
/// Any transport or decoding failure fails the entire call. The returned
/// responses are not guaranteed to line up with the requests.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn fulfill_orders(
        &self,
        orders: &[OrderRequest],
    ) -> Result<Vec<OrderResponse>, OrderError>;
}

/// Accepts single orders without blocking the caller.
pub trait OrderSubmitter: Send + Sync {
    fn submit(&self, order: OrderRequest) -> CompletionHandle;
}

pub type OrderBackendRef = Arc<dyn OrderBackend>;
pub type OrderSubmitterRef = Arc<dyn OrderSubmitter>;
