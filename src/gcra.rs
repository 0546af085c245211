//! GCRA (Generic Cell Rate Algorithm) arithmetic.
//!
//! The algorithm tracks a single "theoretical arrival time" (TAT) per bucket
//! key instead of a discrete token counter, which yields exact fractional
//! refill without periodic resets. Every storage backend runs this same
//! arithmetic; [`MemoryStorage`](crate::MemoryStorage) calls [`apply`]
//! directly and the Redis backend mirrors it in a server-side Lua script so
//! the read-modify-write stays atomic across processes.

use std::time::Duration;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// Result of applying a GCRA delta against a stored TAT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Outcome {
    /// Whether the request is within quota right now.
    pub conforming: bool,
    /// Earliest instant (epoch millis, fractional) at which the delta
    /// conforms. In the past or present when `conforming` is true.
    pub time_to_act: f64,
    /// TAT to persist, with storage expiry at the same instant.
    /// `None` when the decision must not mutate stored state.
    pub new_tat: Option<f64>,
}

/// Apply a token delta of `n` to a bucket.
///
/// `n > 0` consumes tokens, `n == 0` peeks without consuming, and `n < 0`
/// returns tokens from an earlier consumption. A missing `stored_tat` is
/// treated as "fully idle" (TAT = now), and so is a stored TAT in the past,
/// which caps accrual: tokens never accumulate beyond `burst` no matter how
/// long the bucket sat unused.
///
/// All arithmetic is in `f64` milliseconds so weighted (fractional) deltas
/// keep full precision.
pub(crate) fn apply(
    stored_tat: Option<f64>,
    now: f64,
    period: Duration,
    burst: u32,
    n: f64,
) -> Outcome {
    let burst = f64::from(burst.max(1));
    let period_ms = period.as_secs_f64() * 1000.0;

    let emission_interval = period_ms / burst;
    let tolerance = emission_interval * (burst - 1.0);

    let tat = stored_tat.unwrap_or(now).max(now);
    let new_tat = tat + emission_interval * (n - 1.0);
    let time_to_act = new_tat - tolerance;

    if now < time_to_act {
        return Outcome {
            conforming: false,
            time_to_act,
            new_tat: None,
        };
    }

    // Persist one emission interval past the request's own arrival slot.
    // Clamping at `now` makes returning more tokens than were ever taken
    // equivalent to a fully idle bucket instead of banking extra capacity.
    let persisted = (new_tat + emission_interval).max(now);

    Outcome {
        conforming: true,
        time_to_act: persisted - tolerance,
        new_tat: Some(persisted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_secs(20);
    const BURST: u32 = 4;

    fn consume(stored: Option<f64>, now: f64, n: f64) -> Outcome {
        apply(stored, now, PERIOD, BURST, n)
    }

    #[test]
    fn burst_conforms_then_denies() {
        // Period=20s, Burst=4 => emission interval 5s.
        let mut stored = None;
        for _ in 0..4 {
            let out = consume(stored, 0.0, 1.0);
            assert!(out.conforming);
            stored = out.new_tat;
        }
        // Bucket is full: TAT sits one period ahead.
        assert_eq!(stored, Some(20_000.0));

        // Fifth draw at t=0 denies until t=5s...
        let out = consume(stored, 0.0, 1.0);
        assert!(!out.conforming);
        assert_eq!(out.time_to_act, 5_000.0);
        assert_eq!(out.new_tat, None);

        // ...and conforms exactly at t=5s, then again every 5s.
        let out = consume(stored, 5_000.0, 1.0);
        assert!(out.conforming);
        let stored = out.new_tat;
        assert!(!consume(stored, 5_000.0, 1.0).conforming);
        assert!(consume(stored, 10_000.0, 1.0).conforming);
    }

    #[test]
    fn oversized_draw_never_conforms() {
        // n > burst exceeds the capacity ceiling regardless of idle time.
        let out = consume(None, 1_000_000.0, 5.0);
        assert!(!out.conforming);

        // n == burst after long idle takes the whole bucket at once.
        let out = consume(None, 1_000_000.0, 4.0);
        assert!(out.conforming);
        assert_eq!(out.new_tat, Some(1_020_000.0));
    }

    #[test]
    fn idle_bucket_does_not_bank_tokens() {
        // Drain fully at t=0, then stay idle for ten periods.
        let out = consume(None, 0.0, 4.0);
        let stored = out.new_tat;

        // Only `burst` tokens are available, not burst * elapsed periods.
        let now = 200_000.0;
        let out = consume(stored, now, 4.0);
        assert!(out.conforming);
        let stored = out.new_tat;
        assert!(!consume(stored, now, 1.0).conforming);
    }

    #[test]
    fn peek_is_free() {
        let out = consume(None, 0.0, 4.0);
        let stored = out.new_tat;

        // Peeking conforms even on a full bucket and leaves the TAT as-is.
        let peek = consume(stored, 0.0, 0.0);
        assert!(peek.conforming);
        assert_eq!(peek.new_tat, stored);

        // A real draw after the peek behaves exactly as without it.
        assert!(!consume(peek.new_tat, 0.0, 1.0).conforming);
    }

    #[test]
    fn cancel_restores_prior_state() {
        let out = consume(None, 0.0, 1.0);
        let taken = out.new_tat;
        assert_eq!(taken, Some(5_000.0));

        let out = consume(taken, 0.0, -1.0);
        assert!(out.conforming);
        // Clamped at now: a single take+return lands back on idle.
        assert_eq!(out.new_tat, Some(0.0));
    }

    #[test]
    fn excess_returns_are_ignored() {
        let out = consume(None, 1_000.0, 1.0);
        let stored = out.new_tat;

        // Returning far more than was taken must not rewind past idle.
        let out = consume(stored, 1_000.0, -100.0);
        assert!(out.conforming);
        assert_eq!(out.new_tat, Some(1_000.0));

        // No negative capacity: the next burst is still just `burst` wide.
        let stored = out.new_tat;
        assert!(consume(stored, 1_000.0, 4.0).conforming);
    }

    #[test]
    fn fractional_weights_keep_precision() {
        // Two half-weight draws cost exactly one token.
        let a = consume(None, 0.0, 0.5);
        let b = consume(a.new_tat, 0.0, 0.5);
        assert!(a.conforming && b.conforming);
        assert_eq!(b.new_tat, Some(5_000.0));
    }

    #[test]
    fn stale_tat_is_treated_as_idle() {
        // A TAT far in the past behaves like an absent row.
        let fresh = consume(None, 500_000.0, 1.0);
        let stale = consume(Some(10.0), 500_000.0, 1.0);
        assert_eq!(stale, fresh);
    }

    #[test]
    fn burst_of_one_has_no_tolerance() {
        let period = Duration::from_secs(10);
        let out = apply(None, 0.0, period, 1, 1.0);
        assert!(out.conforming);
        assert_eq!(out.new_tat, Some(10_000.0));
        // Second draw waits a full period.
        let out = apply(out.new_tat, 0.0, period, 1, 1.0);
        assert!(!out.conforming);
        assert_eq!(out.time_to_act, 10_000.0);
    }
}
