use std::time::Duration;

/// Clock abstraction so retry loops can be driven in tests without real
/// sleeps.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Production clock backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Outcome of a single retryable attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Terminal outcome; stop the loop and return it.
    Done(T),
    /// Transient outcome; sleep and try again if attempts remain.
    Retry,
}

/// Bounded retry schedule with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Schedule used against the report API: one initial attempt plus five
    /// retries, two seconds apart.
    pub fn api_default() -> Self {
        Self::new(6, Duration::from_secs(2))
    }

    /// Drive `attempt` until it yields a terminal outcome or the schedule is
    /// exhausted, sleeping on `clock` between attempts.
    ///
    /// Returns `Ok(None)` when every attempt asked to retry; errors from the
    /// attempt itself end the loop immediately.
    pub fn run<T, E, F>(&self, clock: &dyn Clock, mut attempt: F) -> Result<Option<T>, E>
    where
        F: FnMut() -> Result<Attempt<T>, E>,
    {
        for n in 0..self.max_attempts {
            if n > 0 {
                clock.sleep(self.delay);
            }
            match attempt()? {
                Attempt::Done(value) => return Ok(Some(value)),
                Attempt::Retry => {}
            }
        }
        Ok(None)
    }
}
