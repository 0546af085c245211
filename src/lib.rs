//! Distributed GCRA rate limiting for identity flows.
//!
//! Quotas are enforced with the Generic Cell Rate Algorithm: per bucket the
//! backend stores a single scalar (the theoretical arrival time), updated in
//! one atomic step, which yields smooth token refill, burst tolerance and
//! correct behavior under concurrent callers across processes.
//!
//! The crate splits into three layers:
//!
//! - **Policy** ([`RateLimitGroup`], [`ResolveOptions`]): business-named
//!   limits (`authentication.password`, `messaging.sms`, ...) resolved
//!   against the configuration tree into concrete [`BucketSpec`]s, with
//!   per-dimension fallback and plan-level caps applied.
//! - **Limiter** ([`Limiter`]): the reservation API. Take tokens, get a
//!   [`Reservation`] receipt you can cancel on abort paths, or a
//!   [`FailedReservation`] carrying the advisory retry-at instant.
//! - **Storage** ([`Storage`]): one atomic operation, two backends.
//!   [`RedisStorage`] runs the decision as a server-side Lua script with
//!   server-authoritative time; [`MemoryStorage`] serves tests and
//!   single-process deployments with an injectable [`Clock`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use fleet_ratelimit::{
//!     BucketName, BucketSpec, Limiter, MemoryStorage, RateLimitConfig, RateLimitGroup,
//!     ReserveOutcome,
//! };
//!
//! # async fn demo() -> Result<(), fleet_ratelimit::RateLimitError> {
//! let limiter = Limiter::new(Arc::new(MemoryStorage::new()));
//!
//! let spec = BucketSpec::new(
//!     RateLimitGroup::AuthenticationPassword,
//!     &RateLimitConfig::new(Duration::from_secs(60), 10),
//!     BucketName::VerifyPasswordPerIP,
//!     vec!["1.2.3.4".to_owned()],
//! );
//!
//! match limiter.reserve(&spec).await? {
//!     ReserveOutcome::Conforming(mut reservation) => {
//!         // ... run the guarded operation; on an abort path:
//!         limiter.cancel(&mut reservation).await;
//!     }
//!     ReserveOutcome::Limited(failed) => return Err(failed.to_error()),
//! }
//! # Ok(())
//! # }
//! ```

mod bucket;
mod clock;
mod config;
mod error;
mod gcra;
mod limiter;
mod policy;
mod storage;
mod storage_redis;

pub use bucket::{BucketName, BucketSpec, RateLimitWeights};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    AppConfig, AuthenticationRateLimits, FeatureConfig, ForgotPasswordChannelRateLimits,
    ForgotPasswordRateLimits, GlobalRateLimitEntry, GlobalRateLimits, MessagingRateLimits,
    OobOtpChannelRateLimits, OobOtpRateLimits, RateLimitConfig, RateLimitDimensions,
    VerificationChannelRateLimits, VerificationRateLimits,
};
pub use error::RateLimitError;
pub use gcra::EpochMillis;
pub use limiter::{FailedReservation, Limiter, Reservation, ReserveOutcome};
pub use policy::{Channel, RateLimitGroup, ResolveOptions};
pub use storage::{MemoryStorage, Storage, UpdateResult};
pub use storage_redis::RedisStorage;
