use crate::domain::order::{OrderRequest, OrderResponse};
use crate::domain::ports::OrderBackend;
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const FULFILL_PATH: &str = "/v1/fulfillorder";

/// Ships batches to the remote backend over HTTP.
///
/// One POST per batch with the orders as a JSON array. Connection failures,
/// non-2xx statuses, empty bodies and undecodable bodies all fail the whole
/// batch with [`OrderError::Dispatch`].
#[derive(Debug, Clone)]
pub struct HttpOrderBackend {
    client: Client,
    endpoint: String,
}

impl HttpOrderBackend {
    /// `timeout` bounds each backend call and is unrelated to the
    /// client-facing request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), FULFILL_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OrderBackend for HttpOrderBackend {
    async fn fulfill_orders(
        &self,
        orders: &[OrderRequest],
    ) -> std::result::Result<Vec<OrderResponse>, OrderError> {
        debug!(endpoint = %self.endpoint, size = orders.len(), "posting batch to backend");

        let response = self
            .client
            .post(&self.endpoint)
            .json(orders)
            .send()
            .await
            .map_err(|e| OrderError::Dispatch(format!("can't POST backend: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrderError::Dispatch(format!(
                "backend responded with {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OrderError::Dispatch(format!("can't read backend response: {e}")))?;
        if body.is_empty() {
            return Err(OrderError::Dispatch(
                "backend returned an empty body".to_string(),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| {
            OrderError::Dispatch(format!("can't decode response from backend: {e}"))
        })
    }
}
