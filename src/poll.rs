//! Periodic background refresh.
//!
//! Spawns a tokio task that starts a fetch cycle on a fixed interval and waits
//! for it to finish before arming the next tick, so automatic refreshes never
//! overlap each other.  A manual refresh from the keyboard can still overlap
//! an automatic one; the coordinator allows that.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use freshfeed::{Coordinator, CoordinatorError, FeedItem};

/// Spawn the refresh task.  The first cycle starts immediately.
///
/// The task ends on its own once the coordinator is closed.
pub fn spawn(coordinator: Arc<Coordinator<FeedItem>>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            debug!("automatic refresh");
            match coordinator.fetch() {
                Ok(cycle) => {
                    if let Err(err) = cycle.await {
                        warn!(error = %err, "refresh cycle did not complete");
                    }
                }
                Err(CoordinatorError::Closed) => return,
                Err(err) => {
                    warn!(error = %err, "could not start refresh");
                    return;
                }
            }
        }
    })
}
