//! Application layer: the batching engine and response routing.
//!
//! `BatchEngine` owns a single worker task fed by a bounded `tokio` channel.
//! The worker accumulates orders into fixed-size batches, dispatches each
//! batch through the `OrderBackend` port and hands the verdicts to the
//! router, which resolves every waiting order.

pub mod engine;
pub mod router;
