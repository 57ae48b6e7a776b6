//! Clock abstraction consumed by [`Generator`](crate::Generator).

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time in milliseconds since the Unix epoch.
///
/// This lets a generator run on the real system clock or on a controlled clock in tests.
///
/// # Examples
///
/// ```rust
/// use uniqueid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn unix_ts_ms(&self) -> i64 {
///         1_704_067_200_000
///     }
/// }
///
/// assert_eq!(FixedTime.unix_ts_ms(), 1_704_067_200_000);
/// ```
pub trait TimeSource {
    /// Returns the current Unix time in milliseconds.
    fn unix_ts_ms(&self) -> i64;
}

/// The real-time UTC wall clock.
///
/// Times before the Unix epoch are reported as negative milliseconds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn unix_ts_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            Err(e) => i64::try_from(e.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
        }
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```rust
/// use uniqueid::{ManualClock, TimeSource};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(24 * 3_600_000);
/// assert_eq!(clock.unix_ts_ms(), 86_401_000);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    /// Creates a clock fixed at `unix_ts_ms`.
    pub const fn new(unix_ts_ms: i64) -> Self {
        Self(AtomicI64::new(unix_ts_ms))
    }

    /// Moves the clock to `unix_ts_ms`, forwards or backwards.
    pub fn set(&self, unix_ts_ms: i64) {
        self.0.store(unix_ts_ms, Ordering::SeqCst);
    }

    /// Moves the clock by `delta_ms`, which may be negative.
    pub fn advance(&self, delta_ms: i64) {
        self.0.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn unix_ts_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn unix_ts_ms(&self) -> i64 {
        (**self).unix_ts_ms()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn unix_ts_ms(&self) -> i64 {
        (**self).unix_ts_ms()
    }
}
