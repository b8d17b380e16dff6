//! Background expiry of unconfirmed proposals

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::app::persistence::Persistence;
use crate::booking::api::Scheduler;
use crate::core::shutdown::ShutdownCoordinator;

/// Periodically expire lapsed proposals until shutdown
pub fn spawn_expiry_sweeper(
    scheduler: Arc<Scheduler>,
    persistence: Arc<Persistence>,
    period: Duration,
    shutdown: &ShutdownCoordinator,
) -> JoinHandle<()> {
    let mut shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        log::debug!("Expiry sweeper started ({:?} period)", period);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => match scheduler.sweep() {
                    Ok(expired) if !expired.is_empty() => {
                        log::info!("Expired {} unconfirmed proposal(s)", expired.len());
                        persistence.save(&scheduler);
                    }
                    Ok(_) => {}
                    Err(e) => log::error!("Expiry sweep failed: {}", e),
                },
            }
        }
        log::debug!("Expiry sweeper stopped");
    })
}
