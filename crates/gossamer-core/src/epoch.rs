//! Transaction valid-start timestamps and the process-wide clock drift
//!
//! The network only accepts a transaction whose valid-start timestamp falls
//! inside its acceptance window. A client whose wall clock runs ahead of the
//! network sees `InvalidTransactionStart`; the executor then records how long
//! the rejected attempt took and adds it to a drift offset that is subtracted
//! from every later valid-start timestamp.
//!
//! The drift offset is process-wide: the skew belongs to the host clock, not
//! to any one client or call. It only ever grows.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Accumulated clock drift, in nanoseconds
static CLOCK_DRIFT_NANOS: AtomicI64 = AtomicI64::new(0);

/// Last timestamp handed out by `unique_clock_nanos`
static LAST_ISSUED_NANOS: AtomicI64 = AtomicI64::new(0);

/// Namespace for the process-wide clock helpers
pub struct Epoch;

impl Epoch {
    /// Wall clock nanoseconds since the Unix epoch
    pub fn clock_nanos() -> i64 {
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }

    /// Wall clock nanoseconds, strictly increasing across all callers
    ///
    /// Two transactions from the same payer must never share a valid-start
    /// timestamp, so concurrent callers landing on the same clock reading
    /// are pushed forward one nanosecond at a time.
    pub fn unique_clock_nanos() -> i64 {
        let now = Self::clock_nanos();
        let previous = LAST_ISSUED_NANOS
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or(now);
        now.max(previous.saturating_add(1))
    }

    /// Unique valid-start split into seconds and nanoseconds
    pub fn unique_seconds_and_nanos(adjust_for_drift: bool) -> (i64, i32) {
        let mut total = Self::unique_clock_nanos();
        if adjust_for_drift {
            total = total.saturating_sub(CLOCK_DRIFT_NANOS.load(Ordering::SeqCst));
        }
        (
            total.div_euclid(NANOS_PER_SECOND),
            total.rem_euclid(NANOS_PER_SECOND) as i32,
        )
    }

    /// Add an observed lag to the process-wide drift offset
    ///
    /// Non-positive observations are ignored so the offset is monotonic.
    pub fn add_to_clock_drift(nanos: i64) {
        if nanos <= 0 {
            return;
        }
        let total = CLOCK_DRIFT_NANOS.fetch_add(nanos, Ordering::SeqCst) + nanos;
        tracing::debug!(added_ns = nanos, total_ns = total, "Adjusted local clock drift");
    }

    /// Current accumulated drift offset
    pub fn clock_drift() -> Duration {
        Duration::from_nanos(CLOCK_DRIFT_NANOS.load(Ordering::SeqCst).max(0) as u64)
    }
}
