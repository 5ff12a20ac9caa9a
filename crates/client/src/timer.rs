//! Live countdown for a task's deadline.
//!
//! [`DeadlineTimer::start`] returns the initial [`TimerData`] together with a
//! receiver for that start's tick updates. When less than a day remains, a
//! 1-second tick loop pushes fresh snapshots to it and ends on its own once
//! the deadline expires. At most one loop runs per timer: restarting,
//! stopping, or dropping the timer cancels it. Each start gets its own
//! channel, so nothing queued for a previous deadline reaches the new
//! receiver.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use taskboard_core::deadline::{parse_optional_due, timer_snapshot, DeadlineStatus, TimerData};
use taskboard_core::types::Timestamp;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_secs(1);

/// Source of "now" for the countdown.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

pub struct DeadlineTimer {
    clock: Arc<dyn Clock>,
    running: Option<CancellationToken>,
}

impl DeadlineTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            running: None,
        }
    }

    /// (Re)start the countdown for `due` (ISO-8601 or absent).
    ///
    /// Any previous tick loop is cancelled before the new snapshot is
    /// computed. The returned receiver yields this start's tick updates and
    /// closes when the loop ends; without a loop it is closed immediately.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, due: Option<&str>) -> (TimerData, mpsc::UnboundedReceiver<TimerData>) {
        self.stop();

        let (updates, rx) = mpsc::unbounded_channel();
        let due = parse_optional_due(due);
        let now = self.clock.now();
        let initial = timer_snapshot(due, now);

        if let Some(due) = due {
            if initial.status == DeadlineStatus::InProgress && (due - now).num_days() < 1 {
                let cancel = CancellationToken::new();
                tokio::spawn(tick_loop(
                    due,
                    Arc::clone(&self.clock),
                    updates,
                    cancel.clone(),
                ));
                self.running = Some(cancel);
            }
        }

        (initial, rx)
    }

    /// Cancel the running tick loop, if any.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.running.take() {
            cancel.cancel();
        }
    }

    /// Whether a tick loop was started and has not been stopped or finished.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|cancel| !cancel.is_cancelled())
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick_loop(
    due: Timestamp,
    clock: Arc<dyn Clock>,
    updates: mpsc::UnboundedSender<TimerData>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let snapshot = timer_snapshot(Some(due), clock.now());
                let expired = snapshot.status == DeadlineStatus::Expired;
                if updates.send(snapshot).is_err() || expired {
                    break;
                }
            }
        }
    }

    // Lets `is_running` report false once the loop has ended by itself.
    cancel.cancel();
}
