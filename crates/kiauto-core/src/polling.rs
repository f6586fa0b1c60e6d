//! Bounded polling shared by every waiting primitive.
//!
//! A wait is a fixed number of synchronous attempts separated by a fixed
//! sleep. The attempt budget is `floor(timeout / interval)`, and the loop
//! sleeps after every unsuccessful attempt, so a wait that never succeeds
//! returns after roughly `timeout` of wall time.

use std::time::Duration;

/// Default time budget for a wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between two attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Timeout and retry cadence of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polling {
    timeout: Duration,
    interval: Duration,
}

impl Polling {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_millis(timeout_ms: u64, interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    /// Same cadence, different time budget.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Number of attempts the budget allows: `floor(timeout / interval)`,
    /// never less than one.
    pub fn attempts(&self) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let attempts = self.timeout.as_nanos() / self.interval.as_nanos();
        attempts.clamp(1, u32::MAX as u128) as u32
    }
}

impl Default for Polling {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_INTERVAL)
    }
}

/// Run `attempt` until it yields a value or the attempt budget is spent.
///
/// `attempt` receives the zero-based attempt number and returns `Ok(None)`
/// for "not yet". Errors end the loop immediately. `Ok(None)` from this
/// function means the budget was exhausted; callers turn that into their own
/// timeout error.
pub fn poll_until<T, E, F>(polling: &Polling, mut attempt: F) -> Result<Option<T>, E>
where
    F: FnMut(u32) -> Result<Option<T>, E>,
{
    for n in 0..polling.attempts() {
        if let Some(value) = attempt(n)? {
            return Ok(Some(value));
        }
        std::thread::sleep(polling.interval());
    }
    Ok(None)
}
