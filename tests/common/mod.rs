#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use batchgate::domain::completion::{Completer, CompletionHandle, Outcome, completion_pair};
use batchgate::domain::order::{OrderRequest, OrderResponse};
use batchgate::domain::ports::{OrderBackend, OrderSubmitter};
use batchgate::error::OrderError;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;

pub const WAIT: Duration = Duration::from_secs(2);

/// Backend whose every call fails.
pub struct FailingBackend;

#[async_trait]
impl OrderBackend for FailingBackend {
    async fn fulfill_orders(
        &self,
        _orders: &[OrderRequest],
    ) -> Result<Vec<OrderResponse>, OrderError> {
        Err(OrderError::Dispatch("backend responded with 503".to_string()))
    }
}

/// Backend that answers every call with the same canned responses.
pub struct ScriptedBackend {
    responses: Vec<OrderResponse>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<(&str, u64, &str)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(order, price, status)| OrderResponse {
                    price,
                    order: order.to_string(),
                    status: status.to_string(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl OrderBackend for ScriptedBackend {
    async fn fulfill_orders(
        &self,
        _orders: &[OrderRequest],
    ) -> Result<Vec<OrderResponse>, OrderError> {
        Ok(self.responses.clone())
    }
}

/// Submitter standing in for the engine in gateway tests.
pub struct StubSubmitter {
    outcome: Option<Outcome>,
    submitted: Mutex<Vec<OrderRequest>>,
    parked: Mutex<Vec<Completer>>,
}

impl StubSubmitter {
    /// Resolves every order immediately with `outcome`.
    pub fn resolving(outcome: Outcome) -> Self {
        Self {
            outcome: Some(outcome),
            submitted: Mutex::new(Vec::new()),
            parked: Mutex::new(Vec::new()),
        }
    }

    /// Never resolves, but keeps the writer half alive.
    pub fn hanging() -> Self {
        Self {
            outcome: None,
            submitted: Mutex::new(Vec::new()),
            parked: Mutex::new(Vec::new()),
        }
    }

    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

impl OrderSubmitter for StubSubmitter {
    fn submit(&self, order: OrderRequest) -> CompletionHandle {
        self.submitted.lock().unwrap().push(order);
        let (completer, handle) = completion_pair();
        match &self.outcome {
            Some(outcome) => completer.complete(outcome.clone()),
            None => self.parked.lock().unwrap().push(completer),
        }
        handle
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
