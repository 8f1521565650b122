//! The handle returned by `subscribe`.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A live subscription. Dropping it leaks the background fetch task; call
/// [`Subscription::unsubscribe`] to drain in-flight handlers and stop
/// cleanly.
pub struct Subscription {
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<()>,
}

impl Subscription {
    /// Stop claiming new messages, drain in-flight handler tasks to
    /// completion, then release the consumer name.
    pub async fn unsubscribe(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}
