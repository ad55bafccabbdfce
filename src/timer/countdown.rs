// src/timer/countdown.rs

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::types::TimeRemaining;

/// Interval between ticks.
pub const TICK: Duration = Duration::from_secs(1);

/// Handle to a running countdown.
///
/// Dropping the handle also stops the countdown.
#[derive(Debug)]
pub struct TimerHandle {
    attempt: u64,
    cancel: Option<oneshot::Sender<()>>,
}

impl TimerHandle {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Stop the countdown. Safe to call repeatedly or after expiry.
    pub fn cancel(&mut self) {
        match self.cancel.take() {
            Some(tx) => {
                if tx.send(()).is_err() {
                    debug!(attempt = self.attempt, "countdown already finished");
                } else {
                    debug!(attempt = self.attempt, "countdown cancelled");
                }
            }
            None => debug!(attempt = self.attempt, "countdown cancel repeated; ignoring"),
        }
    }
}

/// Start the clock for an attempt. Unlimited attempts get no timer.
pub fn start(
    attempt: u64,
    limit: TimeRemaining,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Option<TimerHandle> {
    match limit {
        TimeRemaining::Seconds(seconds) => Some(spawn_countdown(attempt, seconds, runtime_tx)),
        TimeRemaining::Unlimited => {
            info!(attempt, "no time limit; countdown not started");
            None
        }
    }
}

/// Spawn a countdown of `seconds` for `attempt`.
///
/// Emits `TimerTick` after each elapsed second with the new remaining count
/// and `TimerExpired` once that count is zero.
pub fn spawn_countdown(
    attempt: u64,
    seconds: u64,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> TimerHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    info!(attempt, seconds, "countdown started");

    tokio::spawn(async move {
        let mut remaining = seconds;

        while remaining > 0 {
            tokio::select! {
                biased;
                _ = &mut cancel_rx => return,
                _ = sleep(TICK) => {}
            }

            remaining -= 1;
            if runtime_tx
                .send(RuntimeEvent::TimerTick { attempt, remaining })
                .await
                .is_err()
            {
                debug!(attempt, "runtime gone; countdown stopping");
                return;
            }
        }

        info!(attempt, "countdown expired");
        let _ = runtime_tx.send(RuntimeEvent::TimerExpired { attempt }).await;
    });

    TimerHandle {
        attempt,
        cancel: Some(cancel_tx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(rx: &mut mpsc::Receiver<RuntimeEvent>) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_then_expires_once() {
        let (tx, mut rx) = mpsc::channel(16);
        let _timer = spawn_countdown(1, 3, tx);

        tokio::time::sleep(Duration::from_secs(10)).await;

        let events = drain(&mut rx).await;
        let ticks: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                RuntimeEvent::TimerTick { remaining, .. } => Some(*remaining),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![2, 1, 0]);

        let expiries = events
            .iter()
            .filter(|e| matches!(e, RuntimeEvent::TimerExpired { attempt: 1 }))
            .count();
        assert_eq!(expiries, 1);
        assert!(matches!(events.last(), Some(RuntimeEvent::TimerExpired { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_further_ticks_and_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = spawn_countdown(7, 5, tx);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        timer.cancel();
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(30)).await;
        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, RuntimeEvent::TimerTick { attempt: 7, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn unlimited_starts_nothing() {
        let (tx, mut rx) = mpsc::channel(4);
        assert!(start(1, TimeRemaining::Unlimited, tx).is_none());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
