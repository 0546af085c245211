//! Quota configuration data model.
//!
//! Plain data consumed by policy resolution. How these structs are populated
//! (YAML, env, defaults) is the embedding application's concern; only the
//! shape and the fallback semantics live here.
//!
//! Three layers with distinct roles:
//! - [`AppConfig`]: the operator-tunable per-deployment quotas.
//! - [`FeatureConfig`]: plan-level caps; where a cap defines a *lower* rate
//!   than the app entry, the cap wins.
//! - [`GlobalRateLimits`]: environment-wide entries shared by every
//!   deployment, producing their own independent buckets.

use std::time::Duration;

/// One quota entry: an enabled flag, a refill period and a burst size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RateLimitConfig {
    /// Tri-state on purpose: `None` means "unspecified", which lets a
    /// category-general entry take over; `Some(false)` is an explicit off
    /// switch that suppresses the fallback too.
    pub enabled: Option<bool>,
    pub period: Duration,
    pub burst: u32,
}

impl RateLimitConfig {
    /// An explicitly enabled entry.
    #[must_use]
    pub fn new(period: Duration, burst: u32) -> Self {
        Self {
            enabled: Some(true),
            period,
            burst,
        }
    }

    /// Burst with the implicit minimum of one token.
    #[must_use]
    pub(crate) fn burst(&self) -> u32 {
        self.burst.max(1)
    }

    /// Steady-state rate in tokens per second, used to compare an app entry
    /// against a feature cap. Disabled or degenerate entries rank as
    /// infinitely permissive so they never win the "lower rate" contest.
    pub(crate) fn rate(&self) -> f64 {
        if self.enabled != Some(true) || self.period.is_zero() {
            return f64::INFINITY;
        }
        f64::from(self.burst()) / self.period.as_secs_f64()
    }
}

/// Per-IP / per-user-per-IP pair used by most authentication limits.
#[derive(Debug, Clone, Default)]
pub struct RateLimitDimensions {
    pub per_ip: Option<RateLimitConfig>,
    pub per_user_per_ip: Option<RateLimitConfig>,
}

/// OOB-OTP limits for one delivery channel.
#[derive(Debug, Clone, Default)]
pub struct OobOtpChannelRateLimits {
    pub trigger_per_ip: Option<RateLimitConfig>,
    pub trigger_per_user: Option<RateLimitConfig>,
    pub validate_per_ip: Option<RateLimitConfig>,
    pub validate_per_user_per_ip: Option<RateLimitConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct OobOtpRateLimits {
    pub email: OobOtpChannelRateLimits,
    pub sms: OobOtpChannelRateLimits,
}

#[derive(Debug, Clone, Default)]
pub struct AuthenticationRateLimits {
    /// Fallback for unspecified dimension entries of the verify-style
    /// limits below. Never resolved into buckets of its own.
    pub general: RateLimitDimensions,
    pub password: RateLimitDimensions,
    pub oob_otp: OobOtpRateLimits,
    pub totp: RateLimitDimensions,
    pub recovery_code: RateLimitDimensions,
    pub device_token: RateLimitDimensions,
    pub passkey: RateLimitDimensions,
    pub siwe: RateLimitDimensions,
    pub signup: RateLimitDimensions,
    pub signup_anonymous: RateLimitDimensions,
    pub account_enumeration: RateLimitDimensions,
}

/// Verification limits for one delivery channel.
#[derive(Debug, Clone, Default)]
pub struct VerificationChannelRateLimits {
    pub trigger_per_ip: Option<RateLimitConfig>,
    pub trigger_per_user: Option<RateLimitConfig>,
    pub validate_per_ip: Option<RateLimitConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct VerificationRateLimits {
    pub email: VerificationChannelRateLimits,
    pub sms: VerificationChannelRateLimits,
}

/// Forgot-password limits for one delivery channel.
#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordChannelRateLimits {
    pub trigger_per_ip: Option<RateLimitConfig>,
    pub validate_per_ip: Option<RateLimitConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordRateLimits {
    pub email: ForgotPasswordChannelRateLimits,
    pub sms: ForgotPasswordChannelRateLimits,
}

#[derive(Debug, Clone, Default)]
pub struct MessagingRateLimits {
    pub sms: Option<RateLimitConfig>,
    pub sms_per_ip: Option<RateLimitConfig>,
    pub sms_per_target: Option<RateLimitConfig>,
    pub email: Option<RateLimitConfig>,
    pub email_per_ip: Option<RateLimitConfig>,
    pub email_per_target: Option<RateLimitConfig>,
}

/// The operator-tunable quota tree for one deployment.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub authentication: AuthenticationRateLimits,
    pub verification: VerificationRateLimits,
    pub forgot_password: ForgotPasswordRateLimits,
    pub messaging: MessagingRateLimits,
}

/// Plan-level caps. A cap only takes effect where it is stricter (lower
/// rate) than the corresponding app entry.
#[derive(Debug, Clone, Default)]
pub struct FeatureConfig {
    pub messaging: MessagingRateLimits,
}

/// One environment-wide quota entry.
///
/// Unlike [`RateLimitConfig`] there is no tri-state: an env entry either
/// exists and is on, or it is off. No fallback chain applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalRateLimitEntry {
    pub enabled: bool,
    pub period: Duration,
    pub burst: u32,
}

impl GlobalRateLimitEntry {
    #[must_use]
    pub fn new(period: Duration, burst: u32) -> Self {
        Self {
            enabled: true,
            period,
            burst,
        }
    }
}

/// Environment-wide messaging quotas shared across deployments.
#[derive(Debug, Clone, Default)]
pub struct GlobalRateLimits {
    pub sms: GlobalRateLimitEntry,
    pub sms_per_ip: GlobalRateLimitEntry,
    pub sms_per_target: GlobalRateLimitEntry,
    pub email: GlobalRateLimitEntry,
    pub email_per_ip: GlobalRateLimitEntry,
    pub email_per_target: GlobalRateLimitEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_of_disabled_entry_is_infinite() {
        let enabled = RateLimitConfig::new(Duration::from_secs(10), 5);
        assert_eq!(enabled.rate(), 0.5);

        let disabled = RateLimitConfig {
            enabled: Some(false),
            ..enabled.clone()
        };
        assert_eq!(disabled.rate(), f64::INFINITY);

        let unspecified = RateLimitConfig {
            enabled: None,
            ..enabled
        };
        assert_eq!(unspecified.rate(), f64::INFINITY);
    }

    #[test]
    fn burst_has_a_floor_of_one() {
        let c = RateLimitConfig {
            enabled: Some(true),
            period: Duration::from_secs(1),
            burst: 0,
        };
        assert_eq!(c.burst(), 1);
    }
}
