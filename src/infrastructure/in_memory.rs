use crate::domain::order::{OrderRequest, OrderResponse, Status};
use crate::domain::ports::OrderBackend;
use crate::error::OrderError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// An in-process backend that decides batches locally.
///
/// Orders priced at or below `approve_limit` are approved, everything else
/// is rejected. Every received batch is recorded, which makes the backend
/// handy for observing what the engine dispatched.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    approve_limit: u64,
    latency: Option<Duration>,
    batches: Arc<RwLock<Vec<Vec<OrderRequest>>>>,
}

impl InMemoryBackend {
    pub fn new(approve_limit: u64) -> Self {
        Self {
            approve_limit,
            ..Self::default()
        }
    }

    /// Delays every response, simulating a slow backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// All batches received so far, in arrival order.
    pub async fn batches(&self) -> Vec<Vec<OrderRequest>> {
        self.batches.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.batches.read().await.len()
    }

    fn decide(&self, order: &OrderRequest) -> Status {
        if order.price <= self.approve_limit {
            Status::Approved
        } else {
            Status::Rejected
        }
    }
}

#[async_trait]
impl OrderBackend for InMemoryBackend {
    async fn fulfill_orders(
        &self,
        orders: &[OrderRequest],
    ) -> Result<Vec<OrderResponse>, OrderError> {
        self.batches.write().await.push(orders.to_vec());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        Ok(orders
            .iter()
            .map(|order| OrderResponse::new(order.clone(), self.decide(order)))
            .collect())
    }
}
