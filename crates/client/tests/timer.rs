//! Deadline countdown ticking under paused tokio time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use taskboard_client::timer::{Clock, DeadlineTimer};
use taskboard_core::deadline::{DeadlineStatus, TimerData};
use taskboard_core::types::Timestamp;

/// Wall clock that follows tokio's (pausable) clock.
struct TokioClock {
    origin: Instant,
    base: Timestamp,
}

impl TokioClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            base: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn in_secs(&self, secs: i64) -> String {
        (self.base + chrono::Duration::seconds(secs)).to_rfc3339()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed()).unwrap();
        self.base + elapsed
    }
}

fn drain(rx: &mut UnboundedReceiver<TimerData>) -> Vec<TimerData> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

#[tokio::test(start_paused = true)]
async fn test_counts_down_and_stops_at_expiry() {
    let clock = Arc::new(TokioClock::new());
    let due = clock.in_secs(3);
    let mut timer = DeadlineTimer::new(clock);

    let (initial, mut rx) = timer.start(Some(due.as_str()));
    assert_eq!(initial.label, "00:00:03");
    assert!(timer.is_running());

    tokio::time::sleep(Duration::from_millis(5500)).await;

    let labels: Vec<_> = drain(&mut rx).into_iter().map(|d| (d.label, d.status)).collect();
    assert_eq!(
        labels,
        vec![
            ("00:00:02".to_string(), DeadlineStatus::InProgress),
            ("00:00:01".to_string(), DeadlineStatus::InProgress),
            ("Просрочено".to_string(), DeadlineStatus::Expired),
        ]
    );
    assert!(!timer.is_running());
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[tokio::test(start_paused = true)]
async fn test_restart_keeps_a_single_loop() {
    let clock = Arc::new(TokioClock::new());
    let due = clock.in_secs(60);
    let mut timer = DeadlineTimer::new(clock);

    let (_, mut first) = timer.start(Some(due.as_str()));
    let (_, mut second) = timer.start(Some(due.as_str()));

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(drain(&mut first).is_empty());
    let updates = drain(&mut second);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].label, "00:00:59");
}

#[tokio::test(start_paused = true)]
async fn test_restart_with_new_deadline_drops_queued_updates() {
    let clock = Arc::new(TokioClock::new());
    let short = clock.in_secs(10);
    let long = clock.in_secs(5 * 60 * 60);
    let mut timer = DeadlineTimer::new(clock);

    let (_, _old) = timer.start(Some(short.as_str()));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // The first loop has queued "00:00:09" and it is never drained.
    let (initial, mut rx) = timer.start(Some(long.as_str()));
    assert_eq!(initial.label, "04:59:58");
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    tokio::time::sleep(Duration::from_millis(1200)).await;
    let updates = drain(&mut rx);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].label, "04:59:57");
}

#[tokio::test(start_paused = true)]
async fn test_distant_deadline_does_not_tick() {
    let clock = Arc::new(TokioClock::new());
    let due = clock.in_secs(2 * 24 * 60 * 60);
    let mut timer = DeadlineTimer::new(clock);

    let (initial, mut rx) = timer.start(Some(due.as_str()));
    assert_eq!(initial.label, "2 дн.");
    assert!(!timer.is_running());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_updates() {
    let clock = Arc::new(TokioClock::new());
    let due = clock.in_secs(30);
    let mut timer = DeadlineTimer::new(clock);

    let (_, mut rx) = timer.start(Some(due.as_str()));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    timer.stop();
    assert!(!timer.is_running());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(drain(&mut rx).len(), 1);
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_loop() {
    let clock = Arc::new(TokioClock::new());
    let due = clock.in_secs(30);
    let mut timer = DeadlineTimer::new(clock);

    let (_, mut rx) = timer.start(Some(due.as_str()));
    drop(timer);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}
