//! The handle returned by the sweeper and heartbeat-publisher spawners,
//! mirroring the transport's `Subscription` cancellation pattern.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running background health task. Dropping it leaks the task; call
/// [`HealthTask::stop`] to cancel and drain in-flight work per §4.6
/// ("on stop() they drain in-flight work").
pub struct HealthTask {
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<()>,
}

impl HealthTask {
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}
