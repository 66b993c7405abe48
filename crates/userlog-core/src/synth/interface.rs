use chrono::{DateTime, Utc};

/// A source of uniformly distributed indices.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests.
///
/// # Example
/// ```
/// use userlog_core::RandSource;
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn below(&mut self, bound: usize) -> usize {
///         bound - 1
///     }
/// }
///
/// let mut rng = FixedRand;
/// assert_eq!(rng.below(5), 4);
/// ```
pub trait RandSource {
    /// Returns a value in `0..bound`. Callers guarantee `bound > 0`.
    fn below(&mut self, bound: usize) -> usize;
}

/// A trait for time sources that return the current wall-clock time.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

/// [`TimeSource`] backed by the system clock.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
