use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decision the backend reached for a single order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Approved,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Status::Approved),
            "rejected" => Ok(Status::Rejected),
            other => Err(format!("unknown order status {other:?}")),
        }
    }
}

/// A single client order awaiting approval.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct OrderRequest {
    pub price: u64,
    pub order: String,
}

impl OrderRequest {
    pub fn new(price: u64, order: impl Into<String>) -> Self {
        Self {
            price,
            order: order.into(),
        }
    }

    /// The pair used to match backend responses back to requests.
    ///
    /// Two requests with equal fields share a key; the router breaks such
    /// ties by dispatch order.
    pub fn key(&self) -> (u64, &str) {
        (self.price, &self.order)
    }
}

/// Per-order verdict as exchanged with the backend and returned to clients.
///
/// `status` stays a raw string so that unexpected values from the backend
/// survive decoding and can be reported as protocol violations.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct OrderResponse {
    pub price: u64,
    pub order: String,
    #[serde(default)]
    pub status: String,
}

impl OrderResponse {
    pub fn new(request: OrderRequest, status: Status) -> Self {
        Self {
            price: request.price,
            order: request.order,
            status: status.as_str().to_string(),
        }
    }

    pub fn key(&self) -> (u64, &str) {
        (self.price, &self.order)
    }

    pub fn parsed_status(&self) -> Result<Status, String> {
        self.status.parse()
    }
}
