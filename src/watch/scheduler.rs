use std::future::Future;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

/// Identifies one run of a [`Scheduler`] timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

struct ActiveTimer {
    handle: TimerHandle,
    cancel: CancellationToken,
}

/// Repeating timer owned by a single engine. At most one timer runs at a time.
///
/// Every tick spawns the task on its own, so a slow run does not delay the
/// next tick and runs may overlap. A run that fails or panics does not stop
/// the timer.
#[derive(Default)]
pub struct Scheduler {
    active: Mutex<Option<ActiveTimer>>,
    next_id: AtomicU64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period`, the first tick one `period` from now.
    ///
    /// Returns the running timer's handle unchanged if already started.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(
        &self,
        period: Duration,
        task: F,
    ) -> TimerHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut active = self.active.lock();
        if let Some(timer) = active.as_ref() {
            return timer.handle;
        }

        let handle = TimerHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        let cancel = CancellationToken::new();
        let period = period.max(Duration::from_millis(1));
        tokio::spawn(run_timer(handle, period, cancel.clone(), task));
        debug!(timer_id = handle.id, ?period, "timer started");

        *active = Some(ActiveTimer { handle, cancel });
        handle
    }

    /// Prevent further ticks. Runs already in flight are left alone.
    ///
    /// Returns whether a timer was running.
    pub fn stop(&self) -> bool {
        match self.active.lock().take() {
            Some(timer) => {
                timer.cancel.cancel();
                debug!(timer_id = timer.handle.id, "timer stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn current(&self) -> Option<TimerHandle> {
        self.active.lock().as_ref().map(|timer| timer.handle)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.active.get_mut().take() {
            timer.cancel.cancel();
        }
    }
}

async fn run_timer<F, Fut>(
    handle: TimerHandle,
    period: Duration,
    cancel: CancellationToken,
    task: F,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                trace!(timer_id = handle.id, "tick");
                tokio::spawn(task());
            }
        }
    }
}
