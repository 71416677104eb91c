//! Periodic removal of expired timed notes
//!
//! Reads already treat expired notes as gone; this task only reclaims space.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::store::NoteStore;

pub fn spawn_pruner(store: Arc<dyn NoteStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store.prune_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "pruned expired notes"),
                Err(err) => tracing::warn!(error = %err, "pruning expired notes failed"),
            }
        }
    })
}
