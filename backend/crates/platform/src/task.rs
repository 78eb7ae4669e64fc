//! Owned, cancellable periodic background work.
//!
//! A [`PeriodicTask`] belongs to whoever spawned it. Dropping the handle
//! signals the loop to exit; [`PeriodicTask::stop`] also waits for it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Run `tick` every `period`, first run one period after spawning.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(task = name, period_ms = period.as_millis() as u64, "periodic task started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        tick().await;
                    }
                    // Explicit signal or every sender dropped
                    _ = shutdown_rx.recv() => {
                        tracing::debug!(task = name, "periodic task received shutdown signal");
                        break;
                    }
                }
            }
        });

        Self {
            name,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Signal shutdown and wait for the loop to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(task = self.name, error = %e, "periodic task ended abnormally");
            }
        }
        tracing::info!(task = self.name, "periodic task stopped");
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // Errors are expected if the loop already exited
            if let Err(e) = tx.try_send(()) {
                tracing::debug!(task = self.name, error = ?e, "periodic task shutdown signal not delivered");
            }
        }
    }
}
