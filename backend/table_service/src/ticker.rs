//! Background task that counts down kitchen ETAs.

use std::sync::Arc;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::state::AppState;

/// Tick the kitchen board once per configured period until `shutdown`
/// fires. The first tick happens one full period after start.
pub async fn run(state: Arc<AppState>, shutdown: CancellationToken) {
    let period = state.config.kitchen_tick();
    info!("Kitchen ticker starting: period {period:?}");

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let changed = state.kitchen.lock().await.tick();
                debug!(changed, "kitchen ETAs updated");
            }
        }
    }

    info!("Kitchen ticker stopped");
}
