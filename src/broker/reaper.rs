use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::broker::engine::TopicBroker;

/// Runs the periodic dead-connection reaper until `shutdown` is cancelled.
///
/// Exactly one reaper task is expected per broker. Each cycle sweeps the
/// registry, then sleeps for `interval`. The token exists so tests and the
/// process entry point can stop the loop deterministically.
pub async fn run_reaper(broker: Arc<TopicBroker>, interval: Duration, shutdown: CancellationToken) {
    loop {
        sweep(&broker).await;
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("reaper stopped");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// One reaper cycle: evict dead sessions and announce their departure.
///
/// Selects snapshot entries whose connection is neither open nor still
/// connecting, removes each, and broadcasts a departure announcement for
/// every removal that succeeded so remaining topic subscribers learn the
/// peer left. An entry that vanished between snapshot and removal is
/// logged and skipped, not treated as fatal.
pub async fn sweep(broker: &TopicBroker) {
    let dead: Vec<String> = broker
        .registry()
        .snapshot()
        .into_iter()
        .filter(|(_, conn)| conn.state().is_dead())
        .map(|(session_id, _)| session_id)
        .collect();

    let mut removed = Vec::new();
    for session_id in dead {
        if broker.registry().remove_if_present(&session_id) {
            info!("the session was removed successfully: {session_id}");
            removed.push(session_id);
        } else {
            warn!("unable to remove {session_id}");
        }
    }

    for session_id in removed {
        let announcement = format!("User with id {session_id} has left the TOPIC");
        broker.broadcast(&announcement).await;
        info!("{announcement}");
    }
}
