use super::order::Status;
use crate::error::OrderError;
use tokio::sync::oneshot;

pub type Outcome = Result<Status, OrderError>;

/// Creates the two halves of an order's one-shot result.
///
/// The engine owns the [`Completer`] and is its only writer; the submitter
/// owns the [`CompletionHandle`] and is its only reader. Both halves are
/// consumed on use, so an outcome is written at most once and read at most
/// once.
pub fn completion_pair() -> (Completer, CompletionHandle) {
    let (tx, rx) = oneshot::channel();
    (Completer { tx }, CompletionHandle { rx })
}

/// Writer half of an order's result. Owned by the engine.
#[derive(Debug)]
pub struct Completer {
    tx: oneshot::Sender<Outcome>,
}

impl Completer {
    /// Delivers the outcome. A reader that already gave up is not an error.
    pub fn complete(self, outcome: Outcome) {
        let _ = self.tx.send(outcome);
    }

    pub fn fail(self, error: OrderError) {
        self.complete(Err(error));
    }

    /// True once the reader dropped its handle, e.g. after a client timeout.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Reader half of an order's result. Returned to the submitter.
#[derive(Debug)]
pub struct CompletionHandle {
    rx: oneshot::Receiver<Outcome>,
}

impl CompletionHandle {
    /// Waits for the engine to resolve the order.
    ///
    /// A writer dropped without completing is reported as
    /// [`OrderError::Shutdown`].
    pub async fn wait(self) -> Outcome {
        self.rx.await.unwrap_or(Err(OrderError::Shutdown))
    }
}
