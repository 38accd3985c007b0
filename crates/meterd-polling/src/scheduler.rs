use crate::task::PollingTask;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// Runs one periodic timer per distinct polling interval.
///
/// Each task gets its own tokio worker, so a hanging pollster delays only
/// its own interval's next tick. The first run happens one full interval
/// after startup plus a random jitter bounded by the configured shuffle
/// window, so a fleet of agents restarting together doesn't issue its
/// first requests in the same instant.
pub struct PollingScheduler {
    stop_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl PollingScheduler {
    pub fn spawn(tasks: Vec<PollingTask>, shuffle_secs: u64) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut handles = Vec::with_capacity(tasks.len());

        for mut task in tasks {
            let mut stop_rx = stop_rx.clone();
            let jitter = if shuffle_secs == 0 {
                0
            } else {
                rand::thread_rng().gen_range(0..=shuffle_secs)
            };
            let period = Duration::from_secs(task.interval_secs());
            let first_tick = Instant::now() + period + Duration::from_secs(jitter);
            tracing::info!(
                interval_secs = task.interval_secs(),
                jitter_secs = jitter,
                "polling task scheduled"
            );

            handles.push(tokio::spawn(async move {
                let mut ticker = interval_at(first_tick, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => task.poll().await,
                        _ = stop_rx.changed() => break,
                    }
                }
            }));
        }

        Self { stop_tx, handles }
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Signals every timer loop to stop and waits for in-flight polling
    /// cycles to finish. No new cycle starts after this is called.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "polling task worker panicked");
            }
        }
    }
}
