//! Error types for rate limiting.

use thiserror::Error;

use crate::bucket::BucketName;
use crate::gcra::EpochMillis;

/// Errors surfaced by the limiter.
///
/// Quota denials and backend failures are deliberately distinct: a denial is
/// an expected domain outcome carrying a machine-readable bucket name, while
/// a backend error says nothing about quota. The library never decides
/// fail-open versus fail-closed on backend errors; that policy belongs to
/// the caller.
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// The operation exceeded the quota of the named bucket.
    #[error("request rate limited by bucket {bucket}")]
    RateLimited {
        /// Symbolic name of the bucket that denied the request.
        bucket: BucketName,
        /// Earliest instant (epoch millis) at which a retry can conform.
        time_to_act: EpochMillis,
    },

    /// Talking to the storage backend failed.
    #[error("rate limit backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RateLimitError {
    /// Wrap a backend failure.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }

    /// Whether this error is a quota denial (as opposed to a backend
    /// failure).
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
