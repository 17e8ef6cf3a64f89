use crate::domain::completion::Completer;
use crate::domain::order::{OrderRequest, OrderResponse};
use crate::error::OrderError;
use tracing::{debug, warn};

/// An order that has been accepted by the engine and is awaiting its verdict.
#[derive(Debug)]
pub struct PendingEntry {
    pub request: OrderRequest,
    pub completer: Completer,
}

impl PendingEntry {
    pub fn new(request: OrderRequest, completer: Completer) -> Self {
        Self { request, completer }
    }
}

/// Counts reported back to the engine after a batch has been routed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RoutingSummary {
    pub resolved: usize,
    pub protocol_errors: usize,
    pub unmatched_entries: usize,
    pub extra_responses: usize,
}

/// Resolves every entry of a successfully dispatched batch.
///
/// Responses are consumed in the order the backend returned them. Each one
/// resolves the earliest still-open entry with the same key, so duplicate
/// keys are assigned in dispatch order. Entries still open afterwards are
/// failed with a protocol error; responses with no open entry are dropped.
pub fn route_responses(batch: Vec<PendingEntry>, responses: Vec<OrderResponse>) -> RoutingSummary {
    let mut summary = RoutingSummary::default();
    let mut open: Vec<Option<PendingEntry>> = batch.into_iter().map(Some).collect();

    for response in responses {
        let matched = open
            .iter_mut()
            .find(|slot| {
                slot.as_ref()
                    .is_some_and(|entry| entry.request.key() == response.key())
            })
            .and_then(Option::take);

        let Some(entry) = matched else {
            warn!(
                price = response.price,
                order = %response.order,
                "backend returned a response with no pending order"
            );
            summary.extra_responses += 1;
            continue;
        };

        match response.parsed_status() {
            Ok(status) => {
                debug!(price = entry.request.price, order = %entry.request.order, %status, "order resolved");
                entry.completer.complete(Ok(status));
                summary.resolved += 1;
            }
            Err(reason) => {
                warn!(price = entry.request.price, order = %entry.request.order, %reason, "invalid status from backend");
                entry.completer.fail(OrderError::Protocol(reason));
                summary.protocol_errors += 1;
            }
        }
    }

    for entry in open.into_iter().flatten() {
        warn!(price = entry.request.price, order = %entry.request.order, "no backend response for order");
        entry.completer.fail(OrderError::Protocol(format!(
            "backend returned no status for order {:?} at price {}",
            entry.request.order, entry.request.price
        )));
        summary.unmatched_entries += 1;
    }

    summary
}

/// Fails every entry of a batch with the same error.
pub fn fail_batch(batch: Vec<PendingEntry>, error: OrderError) {
    for entry in batch {
        entry.completer.fail(error.clone());
    }
}
