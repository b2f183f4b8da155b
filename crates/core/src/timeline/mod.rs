use std::time::Duration;

use chrono::{NaiveTime, Timelike};

/// Simulated time of day.
///
/// The slider sets or clears `override_hour`; everything else reads the hour
/// through [`resolve_hour`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TimeState {
    override_hour: Option<u8>,
}

impl TimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn override_hour(&self) -> Option<u8> {
        self.override_hour
    }

    /// Applies slider input. Hours outside `0..=23` are rejected and leave the
    /// current override in place.
    pub fn set_override(&mut self, hour: Option<u8>) -> bool {
        match hour {
            Some(h) if h > 23 => {
                tracing::warn!(hour = h, "ignoring out-of-range time override");
                false
            }
            _ => {
                self.override_hour = hour;
                true
            }
        }
    }

    pub fn resolve(&self, now: NaiveTime) -> u8 {
        resolve_hour(self.override_hour, now)
    }

    /// Digital clock text: simulated hour, real minutes and seconds.
    pub fn clock_text(&self, now: NaiveTime) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.resolve(now),
            now.minute(),
            now.second()
        )
    }
}

/// Returns the override when present, otherwise the wall-clock hour.
pub fn resolve_hour(override_hour: Option<u8>, now: NaiveTime) -> u8 {
    // `hour()` is always below 24.
    override_hour.unwrap_or(now.hour() as u8)
}

/// Restartable deferred task.
///
/// Scheduling while a task is pending replaces it and restarts the delay, so
/// only the last payload of a burst is ever released.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Duration, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the task to fire `delay` after `now`. Returns `true` when an
    /// earlier pending task was superseded.
    pub fn schedule(&mut self, payload: T, now: Duration) -> bool {
        self.pending.replace((now + self.delay, payload)).is_some()
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Releases the payload once its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }
}
