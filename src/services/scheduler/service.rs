use chrono::{DateTime, Days, NaiveTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

use crate::services::ingest::CursorStorage;

/// Injectable time source so firing logic is testable with a simulated clock
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Milliseconds until the next UTC midnight, strictly in the future.
///
/// At exactly midnight the target is the following midnight, so the result is
/// always in (0, 24h].
pub fn ms_until_next_midnight(now: DateTime<Utc>) -> u64 {
    let tomorrow = now.date_naive() + Days::new(1);
    let next = tomorrow.and_time(NaiveTime::MIN).and_utc();
    let ms = (next - now).num_milliseconds();
    // Sub-millisecond remainders truncate to zero; the boundary is still ahead
    ms.max(1) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Armed,
    Firing,
}

/// Fires the daily distribution action once per UTC day.
///
/// Holds its own state and an injectable clock; at most one firing is in
/// flight because the single loop rearms only after the firing completes.
pub struct DailyScheduler<C: Clock> {
    clock: C,
    storage: Arc<dyn CursorStorage>,
    state: watch::Sender<SchedulerState>,
}

impl<C: Clock> DailyScheduler<C> {
    pub fn new(clock: C, storage: Arc<dyn CursorStorage>) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        DailyScheduler {
            clock,
            storage,
            state,
        }
    }

    /// Subscribes to the scheduler's lifecycle transitions
    pub fn state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Runs the arm/fire/rearm loop until the shutdown signal flips.
    ///
    /// A failed firing is logged and treated as one missed cycle; the next
    /// boundary is always recomputed from the current time afterwards. A
    /// firing whose UTC date matches the persisted last-fired date is skipped,
    /// which prevents double-firing after a restart.
    pub async fn run<F, Fut>(self, on_fire: F, mut shutdown: watch::Receiver<bool>)
    where
        F: Fn() -> Fut + Send,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send,
    {
        loop {
            let now = self.clock.now_utc();
            let delay = ms_until_next_midnight(now);
            self.state.send_replace(SchedulerState::Armed);
            info!(delay_ms = delay, "Daily trigger armed for next UTC midnight");

            tokio::select! {
                _ = shutdown.changed() => {
                    self.state.send_replace(SchedulerState::Idle);
                    info!("Scheduler shutting down");
                    return;
                }
                _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
            }

            self.state.send_replace(SchedulerState::Firing);
            let today = self.clock.now_utc().date_naive();

            match self.storage.get_last_fired_date().await {
                Ok(Some(date)) if date == today => {
                    info!(date = %today, "Already fired today, skipping this cycle");
                }
                Ok(_) => match on_fire().await {
                    Ok(()) => {
                        if let Err(e) = self.storage.save_last_fired_date(today).await {
                            error!("Failed to persist last-fired date: {}", e);
                        }
                        info!(date = %today, "Daily firing completed");
                    }
                    Err(e) => {
                        error!("Daily firing failed, treating as a missed cycle: {}", e);
                    }
                },
                Err(e) => {
                    // Firing without the read risks a double fire after restart
                    error!("Could not read last-fired date, skipping this cycle: {}", e);
                }
            }
        }
    }
}
