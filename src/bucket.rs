//! Bucket identity and quota parameters.
//!
//! A [`BucketSpec`] is the full description of one rate-limited dimension:
//! a symbolic name, the ordered arguments that parameterize it (IP address,
//! user ID, ...), and the quota itself (`period` / `burst`). Specs are cheap
//! value objects built fresh for every check; the only durable state lives in
//! the storage backend under [`BucketSpec::key`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::config::{GlobalRateLimitEntry, RateLimitConfig};
use crate::policy::RateLimitGroup;

/// Separator between the bucket name and its arguments in the storage key.
const KEY_SEPARATOR: &str = ":";

/// Symbolic identifier of one rate-limited operation class.
///
/// The variant name is the wire-stable storage-key component and the
/// machine-readable reason attached to "too many requests" errors, so
/// renaming a variant is a breaking change for deployed state.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketName {
    SignupAnonymousPerIP,
    SignupPerIP,
    AccountEnumerationPerIP,

    OOBOTPTriggerEmailPerIP,
    OOBOTPTriggerSMSPerIP,
    OOBOTPTriggerWhatsappPerIP,
    OOBOTPTriggerEmailPerUser,
    OOBOTPTriggerSMSPerUser,
    OOBOTPTriggerWhatsappPerUser,
    OOBOTPValidateEmailPerIP,
    OOBOTPValidateSMSPerIP,
    OOBOTPValidateWhatsappPerIP,
    OOBOTPValidateEmailPerUserPerIP,
    OOBOTPValidateSMSPerUserPerIP,
    OOBOTPValidateWhatsappPerUserPerIP,

    VerificationTriggerEmailPerIP,
    VerificationTriggerSMSPerIP,
    VerificationTriggerWhatsappPerIP,
    VerificationTriggerEmailPerUser,
    VerificationTriggerSMSPerUser,
    VerificationTriggerWhatsappPerUser,
    VerificationValidateEmailPerIP,
    VerificationValidateSMSPerIP,
    VerificationValidateWhatsappPerIP,

    VerifyPasswordPerIP,
    VerifyPasswordPerUserPerIP,
    VerifyTOTPPerIP,
    VerifyTOTPPerUserPerIP,
    VerifyPasskeyPerIP,
    VerifyRecoveryCodePerIP,
    VerifyRecoveryCodePerUserPerIP,
    VerifyDeviceTokenPerIP,
    VerifyDeviceTokenPerUserPerIP,
    VerifySIWEPerIP,

    ForgotPasswordTriggerEmailPerIP,
    ForgotPasswordTriggerSMSPerIP,
    ForgotPasswordTriggerWhatsappPerIP,
    ForgotPasswordValidateEmailPerIP,
    ForgotPasswordValidateSMSPerIP,
    ForgotPasswordValidateWhatsappPerIP,

    MessagingSMS,
    MessagingSMSPerIP,
    MessagingSMSPerTarget,
    MessagingEmail,
    MessagingEmailPerIP,
    MessagingEmailPerTarget,

    OAuthTokenClientCredentialsPerClient,
    OAuthTokenClientCredentialsPerProject,
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Variant names are the stable identifiers.
        write!(f, "{self:?}")
    }
}

/// Immutable description of one quota dimension.
///
/// Two specs with equal name and arguments always resolve to the same stored
/// quota state; different arguments resolve to fully independent state.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSpec {
    /// The rate-limit group this bucket belongs to, used for weight lookup.
    pub group: RateLimitGroup,
    pub name: BucketName,
    /// Ordered, order-significant parameters; part of the storage key.
    pub arguments: Vec<String>,
    /// Whether this spec uses the shared GCRA accounting path. Always true
    /// for specs built by policy resolution; the limiter refuses specs that
    /// are not.
    pub is_global: bool,
    /// A disabled spec is a permanent no-op: it always conforms and nothing
    /// is stored.
    pub enabled: bool,
    /// Refill period. Together with `burst` this defines the steady-state
    /// rate (`burst` tokens per `period`).
    pub period: Duration,
    /// Maximum number of tokens obtainable in one period.
    pub burst: u32,
}

impl BucketSpec {
    /// Build a spec from an app-level quota config entry.
    ///
    /// The spec is enabled only when the config says `enabled: true`
    /// explicitly and carries a usable period; anything else yields a
    /// permanent no-op spec.
    pub fn new(
        group: RateLimitGroup,
        config: &RateLimitConfig,
        name: BucketName,
        arguments: Vec<String>,
    ) -> Self {
        let enabled = config.enabled == Some(true) && !config.period.is_zero();
        Self {
            group,
            name,
            arguments,
            is_global: true,
            enabled,
            period: config.period,
            burst: config.burst(),
        }
    }

    /// Build a spec from a deployment-wide (environment) quota entry.
    pub fn global(
        group: RateLimitGroup,
        entry: &GlobalRateLimitEntry,
        name: BucketName,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            group,
            name,
            arguments,
            is_global: true,
            enabled: entry.enabled && !entry.period.is_zero(),
            period: entry.period,
            burst: entry.burst.max(1),
        }
    }

    /// A spec that never limits anything.
    #[must_use]
    pub fn disabled(group: RateLimitGroup, name: BucketName) -> Self {
        Self {
            group,
            name,
            arguments: Vec::new(),
            is_global: true,
            enabled: false,
            period: Duration::ZERO,
            burst: 0,
        }
    }

    /// The storage row identity: name and arguments joined by `:`.
    #[must_use]
    pub fn key(&self) -> String {
        let mut key = self.name.to_string();
        for arg in &self.arguments {
            key.push_str(KEY_SEPARATOR);
            key.push_str(arg);
        }
        key
    }
}

/// Per-request weight overrides, keyed by rate-limit group.
///
/// A weight scales how many tokens one logical request costs. Passed
/// explicitly to [`Limiter::reserve_weighted`](crate::Limiter::reserve_weighted);
/// groups without an entry cost the default weight of 1.
#[derive(Debug, Clone, Default)]
pub struct RateLimitWeights(HashMap<RateLimitGroup, f64>);

impl RateLimitWeights {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight for a group. Negative weights are clamped to zero on
    /// resolution.
    pub fn set(&mut self, group: RateLimitGroup, weight: f64) -> &mut Self {
        self.0.insert(group, weight);
        self
    }

    pub(crate) fn get(&self, group: RateLimitGroup) -> Option<f64> {
        self.0.get(&group).copied()
    }
}
