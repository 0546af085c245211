//! The reservation API over a storage backend.
//!
//! [`Limiter`] is the public service: it turns a [`BucketSpec`] into an
//! allow/deny decision with race-free accounting, handing back lightweight
//! in-process receipts. A [`Reservation`] can later be canceled to return
//! its tokens (abort paths); a [`FailedReservation`] carries the advisory
//! retry-at instant and converts into a structured "too many requests"
//! error.
//!
//! Every call is one blocking round trip to the backend. The limiter holds
//! no locks and no cross-request state, so any number of processes can call
//! it concurrently; correctness rests entirely on the backend's atomic
//! update.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::bucket::{BucketName, BucketSpec, RateLimitWeights};
use crate::error::RateLimitError;
use crate::gcra::EpochMillis;
use crate::storage::Storage;

/// Receipt for tokens successfully taken. Never persisted; dropping it
/// without canceling simply lets the tokens stand.
#[derive(Debug)]
pub struct Reservation {
    spec: BucketSpec,
    key: String,
    tokens_taken: f64,
    consumed: bool,
}

impl Reservation {
    #[must_use]
    pub fn spec(&self) -> &BucketSpec {
        &self.spec
    }

    /// Tokens this reservation took; zero for a disabled spec.
    #[must_use]
    pub fn tokens_taken(&self) -> f64 {
        self.tokens_taken
    }

    /// Mark the reservation as spent so a later [`Limiter::cancel`] is a
    /// no-op. Call this once the guarded operation actually consumed the
    /// quota (e.g. the OTP turned out wrong).
    pub fn prevent_cancel(&mut self) {
        self.consumed = true;
    }
}

/// Receipt for a denied reservation.
#[derive(Debug, Clone)]
pub struct FailedReservation {
    spec: BucketSpec,
    time_to_act: EpochMillis,
}

impl FailedReservation {
    /// Name of the bucket that denied the request, for machine-readable
    /// error reasons.
    #[must_use]
    pub fn bucket_name(&self) -> BucketName {
        self.spec.name
    }

    /// Earliest instant (epoch millis) at which a retry can conform.
    /// Advisory only; the limiter itself never retries.
    #[must_use]
    pub fn time_to_act(&self) -> EpochMillis {
        self.time_to_act
    }

    /// The domain error for surfacing this denial to an API client.
    #[must_use]
    pub fn to_error(&self) -> RateLimitError {
        RateLimitError::RateLimited {
            bucket: self.spec.name,
            time_to_act: self.time_to_act,
        }
    }
}

/// Outcome of a reservation attempt that reached the backend.
#[derive(Debug)]
pub enum ReserveOutcome {
    /// Within quota; tokens were taken.
    Conforming(Reservation),
    /// Over quota; nothing was taken.
    Limited(FailedReservation),
}

impl ReserveOutcome {
    #[must_use]
    pub fn is_conforming(&self) -> bool {
        matches!(self, Self::Conforming(_))
    }

    /// Collapse a denial into its domain error.
    pub fn into_result(self) -> Result<Reservation, RateLimitError> {
        match self {
            Self::Conforming(reservation) => Ok(reservation),
            Self::Limited(failed) => Err(failed.to_error()),
        }
    }
}

/// The rate limiting service. Cheap to clone; clones share the backend.
#[derive(Debug, Clone)]
pub struct Limiter {
    storage: Arc<dyn Storage>,
}

impl Limiter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Reserve one token.
    pub async fn reserve(&self, spec: &BucketSpec) -> Result<ReserveOutcome, RateLimitError> {
        self.reserve_n(spec, 1.0).await
    }

    /// Reserve with the weight configured for the spec's group (default 1).
    pub async fn reserve_weighted(
        &self,
        spec: &BucketSpec,
        weights: &RateLimitWeights,
    ) -> Result<ReserveOutcome, RateLimitError> {
        let n = spec.group.resolve_weight(Some(weights));
        self.reserve_n(spec, n).await
    }

    /// Reserve `n` tokens at once.
    ///
    /// A disabled spec always conforms and takes nothing.
    ///
    /// # Panics
    ///
    /// Panics if `spec` is not a global spec; the shared GCRA path and any
    /// legacy per-process accounting are not interchangeable, so reaching
    /// here with a non-global spec is a wiring bug.
    pub async fn reserve_n(
        &self,
        spec: &BucketSpec,
        n: f64,
    ) -> Result<ReserveOutcome, RateLimitError> {
        assert!(
            spec.is_global,
            "non-global bucket spec {} passed to the global limiter",
            spec.name
        );

        if !spec.enabled {
            return Ok(ReserveOutcome::Conforming(Reservation {
                spec: spec.clone(),
                key: String::new(),
                tokens_taken: 0.0,
                consumed: false,
            }));
        }

        let key = spec.key();
        let result = self.storage.update(&key, spec.period, spec.burst, n).await?;

        if result.conforming {
            Ok(ReserveOutcome::Conforming(Reservation {
                spec: spec.clone(),
                key,
                tokens_taken: n,
                consumed: false,
            }))
        } else {
            debug!(
                bucket = %spec.name,
                time_to_act = result.time_to_act,
                "reservation denied"
            );
            Ok(ReserveOutcome::Limited(FailedReservation {
                spec: spec.clone(),
                time_to_act: result.time_to_act,
            }))
        }
    }

    /// Reserve one token without keeping the receipt; no later cancellation
    /// is possible. Returns the denial, if any.
    pub async fn allow(
        &self,
        spec: &BucketSpec,
    ) -> Result<Option<FailedReservation>, RateLimitError> {
        match self.reserve(spec).await? {
            ReserveOutcome::Conforming(_) => Ok(None),
            ReserveOutcome::Limited(failed) => Ok(Some(failed)),
        }
    }

    /// When could one token be taken, without consuming anything? Returns
    /// an instant in the past or present when the bucket would conform
    /// right now; always `0` for a disabled spec.
    pub async fn get_time_to_act(&self, spec: &BucketSpec) -> Result<EpochMillis, RateLimitError> {
        if !spec.enabled {
            return Ok(0);
        }
        let result = self
            .storage
            .update(&spec.key(), spec.period, spec.burst, 0.0)
            .await?;
        Ok(result.time_to_act)
    }

    /// Return a reservation's tokens. Effective at most once per
    /// reservation; zero-token reservations are no-ops.
    ///
    /// Best-effort by design: a backend error here is logged and swallowed,
    /// since a lost return only makes future throttling marginally stricter.
    pub async fn cancel(&self, reservation: &mut Reservation) {
        if reservation.consumed || reservation.tokens_taken == 0.0 {
            return;
        }
        reservation.consumed = true;

        let spec = &reservation.spec;
        if let Err(err) = self
            .storage
            .update(
                &reservation.key,
                spec.period,
                spec.burst,
                -reservation.tokens_taken,
            )
            .await
        {
            warn!(
                bucket = %spec.name,
                error = %err,
                "failed to return rate limit tokens"
            );
        }
    }
}
