//! A start/stop periodic timer on top of `tokio::time::Interval`.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::warn;

/// First-tick delay used when `now + period` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Fires every `period` while enabled.
///
/// Unlike a bare `Interval`, the first tick comes one full period after
/// [`start`](PeriodicTimer::start), and [`tick`](PeriodicTimer::tick) simply
/// never completes while the timer is stopped or suspended, which makes it
/// safe to use as a `select!` branch at all times.
#[derive(Debug)]
pub struct PeriodicTimer {
    period: Duration,
    interval: Option<Interval>,
    suspended: bool,
}

impl PeriodicTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
            suspended: false,
        }
    }

    /// Arms the timer. Does nothing if it is already running.
    pub fn start(&mut self) {
        if self.interval.is_none() {
            self.interval = Some(self.arm());
        }
    }

    fn arm(&self) -> Interval {
        let now = Instant::now();
        let first = now.checked_add(self.period).unwrap_or_else(|| {
            warn!("Timer period {:?} is out of range, it will not fire", self.period);
            now + FAR_FUTURE
        });
        let mut interval = interval_at(first, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    pub fn stop(&mut self) {
        self.interval = None;
        self.suspended = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// Holds back ticks without disarming the timer.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Lets ticks through again. Ticks that came due while suspended are
    /// dropped; the next one is a full period away.
    pub fn resume(&mut self) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        if self.interval.is_some() {
            self.interval = Some(self.arm());
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Waits for the next tick. Pending forever while stopped or suspended.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) if !self.suspended => {
                interval.tick().await;
            }
            _ => std::future::pending::<()>().await,
        }
    }
}
