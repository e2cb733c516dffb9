//! Background task that periodically drops expired sessions.

use tokio::time::Duration;
use tracing::info;

use super::store::SharedSessionStore;
use crate::shared::shutdown::ShutdownSignal;

/// Start the session sweeper. Stops when `shutdown` fires.
pub fn start_session_sweeper(
    store: SharedSessionStore,
    shutdown: ShutdownSignal,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval = interval_secs, "Session sweeper started");

        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        // First tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    store.purge_expired();
                }
                _ = shutdown.wait() => {
                    info!("Session sweeper shutting down");
                    break;
                }
            }
        }
    })
}
