//! Policy resolution: abstract rate-limit groups to concrete bucket specs.
//!
//! Business code never builds a [`BucketSpec`] by hand. It names a
//! [`RateLimitGroup`] (e.g. `authentication.password`), hands over the
//! request context, and gets back the ordered list of specs to enforce with
//! AND semantics: every spec must independently conform, and any specs
//! already reserved before a later one fails must be canceled by the caller.
//!
//! Resolution applies a per-dimension fallback chain: an unspecified
//! dimension entry inherits the category-general entry, an explicitly
//! disabled entry stays disabled without fallback, and a dimension with no
//! applicable config (or no identifier in the context) is simply absent from
//! the result.

use std::fmt;
use std::time::Duration;

use crate::bucket::{BucketName, BucketSpec, RateLimitWeights};
use crate::config::{AppConfig, FeatureConfig, GlobalRateLimits, RateLimitConfig};

/// Delivery channel for out-of-band codes and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
}

/// Abstract, business-named rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitGroup {
    /// Fallback for the verify-style authentication limits; resolving it
    /// directly is a wiring bug.
    AuthenticationGeneral,
    AuthenticationPassword,
    AuthenticationOobOtpEmailTrigger,
    AuthenticationOobOtpEmailValidate,
    AuthenticationOobOtpSmsTrigger,
    AuthenticationOobOtpSmsValidate,
    AuthenticationTotp,
    AuthenticationRecoveryCode,
    AuthenticationDeviceToken,
    AuthenticationPasskey,
    AuthenticationSiwe,
    AuthenticationSignup,
    AuthenticationSignupAnonymous,
    AuthenticationAccountEnumeration,

    VerificationEmailTrigger,
    VerificationEmailValidate,
    VerificationSmsTrigger,
    VerificationSmsValidate,

    ForgotPasswordEmailTrigger,
    ForgotPasswordEmailValidate,
    ForgotPasswordSmsTrigger,
    ForgotPasswordSmsValidate,

    MessagingSms,
    MessagingEmail,

    OAuthTokenClientCredentials,
}

/// Request context consumed by [`RateLimitGroup::resolve_bucket_specs`].
///
/// Optional fields gate their dimensions: a per-user bucket is only produced
/// when `user_id` is present, a per-client bucket when `client_id` is.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub ip_address: String,
    pub user_id: Option<String>,
    /// Disambiguates OTP buckets sharing a channel (login vs. reauth etc.).
    pub purpose: String,
    pub channel: Option<Channel>,
    /// Message recipient (email address / phone number) for per-target
    /// messaging buckets.
    pub target: String,
    pub client_id: Option<String>,
}

impl RateLimitGroup {
    /// The dotted wire name of this group.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AuthenticationGeneral => "authentication.general",
            Self::AuthenticationPassword => "authentication.password",
            Self::AuthenticationOobOtpEmailTrigger => "authentication.oob_otp.email.trigger",
            Self::AuthenticationOobOtpEmailValidate => "authentication.oob_otp.email.validate",
            Self::AuthenticationOobOtpSmsTrigger => "authentication.oob_otp.sms.trigger",
            Self::AuthenticationOobOtpSmsValidate => "authentication.oob_otp.sms.validate",
            Self::AuthenticationTotp => "authentication.totp",
            Self::AuthenticationRecoveryCode => "authentication.recovery_code",
            Self::AuthenticationDeviceToken => "authentication.device_token",
            Self::AuthenticationPasskey => "authentication.passkey",
            Self::AuthenticationSiwe => "authentication.siwe",
            Self::AuthenticationSignup => "authentication.signup",
            Self::AuthenticationSignupAnonymous => "authentication.signup_anonymous",
            Self::AuthenticationAccountEnumeration => "authentication.account_enumeration",
            Self::VerificationEmailTrigger => "verification.email.trigger",
            Self::VerificationEmailValidate => "verification.email.validate",
            Self::VerificationSmsTrigger => "verification.sms.trigger",
            Self::VerificationSmsValidate => "verification.sms.validate",
            Self::ForgotPasswordEmailTrigger => "forgot_password.email.trigger",
            Self::ForgotPasswordEmailValidate => "forgot_password.email.validate",
            Self::ForgotPasswordSmsTrigger => "forgot_password.sms.trigger",
            Self::ForgotPasswordSmsValidate => "forgot_password.sms.validate",
            Self::MessagingSms => "messaging.sms",
            Self::MessagingEmail => "messaging.email",
            Self::OAuthTokenClientCredentials => "oauth.token.client_credentials",
        }
    }

    fn per_ip_config<'a>(
        self,
        cfg: &'a AppConfig,
        feature: Option<&'a FeatureConfig>,
    ) -> Option<&'a RateLimitConfig> {
        let auth = &cfg.authentication;
        let general = auth.general.per_ip.as_ref();
        match self {
            Self::AuthenticationGeneral => resolve_config(general, None, None),
            Self::AuthenticationPassword => {
                resolve_config(auth.password.per_ip.as_ref(), general, None)
            }
            Self::AuthenticationOobOtpEmailTrigger => {
                resolve_config(auth.oob_otp.email.trigger_per_ip.as_ref(), None, None)
            }
            Self::AuthenticationOobOtpEmailValidate => {
                resolve_config(auth.oob_otp.email.validate_per_ip.as_ref(), general, None)
            }
            Self::AuthenticationOobOtpSmsTrigger => {
                resolve_config(auth.oob_otp.sms.trigger_per_ip.as_ref(), None, None)
            }
            Self::AuthenticationOobOtpSmsValidate => {
                resolve_config(auth.oob_otp.sms.validate_per_ip.as_ref(), general, None)
            }
            Self::AuthenticationTotp => resolve_config(auth.totp.per_ip.as_ref(), general, None),
            Self::AuthenticationRecoveryCode => {
                resolve_config(auth.recovery_code.per_ip.as_ref(), general, None)
            }
            Self::AuthenticationDeviceToken => {
                resolve_config(auth.device_token.per_ip.as_ref(), general, None)
            }
            Self::AuthenticationPasskey => {
                resolve_config(auth.passkey.per_ip.as_ref(), general, None)
            }
            Self::AuthenticationSiwe => resolve_config(auth.siwe.per_ip.as_ref(), general, None),
            Self::AuthenticationSignup => resolve_config(auth.signup.per_ip.as_ref(), None, None),
            Self::AuthenticationSignupAnonymous => {
                resolve_config(auth.signup_anonymous.per_ip.as_ref(), None, None)
            }
            Self::AuthenticationAccountEnumeration => {
                resolve_config(auth.account_enumeration.per_ip.as_ref(), None, None)
            }
            Self::VerificationEmailTrigger => {
                resolve_config(cfg.verification.email.trigger_per_ip.as_ref(), None, None)
            }
            Self::VerificationEmailValidate => {
                resolve_config(cfg.verification.email.validate_per_ip.as_ref(), None, None)
            }
            Self::VerificationSmsTrigger => {
                resolve_config(cfg.verification.sms.trigger_per_ip.as_ref(), None, None)
            }
            Self::VerificationSmsValidate => {
                resolve_config(cfg.verification.sms.validate_per_ip.as_ref(), None, None)
            }
            Self::ForgotPasswordEmailTrigger => {
                resolve_config(cfg.forgot_password.email.trigger_per_ip.as_ref(), None, None)
            }
            Self::ForgotPasswordEmailValidate => {
                resolve_config(cfg.forgot_password.email.validate_per_ip.as_ref(), None, None)
            }
            Self::ForgotPasswordSmsTrigger => {
                resolve_config(cfg.forgot_password.sms.trigger_per_ip.as_ref(), None, None)
            }
            Self::ForgotPasswordSmsValidate => {
                resolve_config(cfg.forgot_password.sms.validate_per_ip.as_ref(), None, None)
            }
            Self::MessagingSms => resolve_config(
                cfg.messaging.sms_per_ip.as_ref(),
                None,
                feature.and_then(|f| f.messaging.sms_per_ip.as_ref()),
            ),
            Self::MessagingEmail => resolve_config(
                cfg.messaging.email_per_ip.as_ref(),
                None,
                feature.and_then(|f| f.messaging.email_per_ip.as_ref()),
            ),
            Self::OAuthTokenClientCredentials => None,
        }
    }

    fn per_user_config(self, cfg: &AppConfig) -> Option<&RateLimitConfig> {
        match self {
            Self::AuthenticationOobOtpEmailTrigger => {
                resolve_config(cfg.authentication.oob_otp.email.trigger_per_user.as_ref(), None, None)
            }
            Self::AuthenticationOobOtpSmsTrigger => {
                resolve_config(cfg.authentication.oob_otp.sms.trigger_per_user.as_ref(), None, None)
            }
            Self::VerificationEmailTrigger => {
                resolve_config(cfg.verification.email.trigger_per_user.as_ref(), None, None)
            }
            Self::VerificationSmsTrigger => {
                resolve_config(cfg.verification.sms.trigger_per_user.as_ref(), None, None)
            }
            _ => None,
        }
    }

    fn per_user_per_ip_config(self, cfg: &AppConfig) -> Option<&RateLimitConfig> {
        let auth = &cfg.authentication;
        let general = auth.general.per_user_per_ip.as_ref();
        match self {
            Self::AuthenticationGeneral => resolve_config(general, None, None),
            Self::AuthenticationPassword => {
                resolve_config(auth.password.per_user_per_ip.as_ref(), general, None)
            }
            Self::AuthenticationOobOtpEmailValidate => resolve_config(
                auth.oob_otp.email.validate_per_user_per_ip.as_ref(),
                general,
                None,
            ),
            Self::AuthenticationOobOtpSmsValidate => resolve_config(
                auth.oob_otp.sms.validate_per_user_per_ip.as_ref(),
                general,
                None,
            ),
            Self::AuthenticationTotp => {
                resolve_config(auth.totp.per_user_per_ip.as_ref(), general, None)
            }
            Self::AuthenticationRecoveryCode => {
                resolve_config(auth.recovery_code.per_user_per_ip.as_ref(), general, None)
            }
            Self::AuthenticationDeviceToken => {
                resolve_config(auth.device_token.per_user_per_ip.as_ref(), general, None)
            }
            _ => None,
        }
    }

    fn per_target_config<'a>(
        self,
        cfg: &'a AppConfig,
        feature: Option<&'a FeatureConfig>,
    ) -> Option<&'a RateLimitConfig> {
        match self {
            Self::MessagingSms => resolve_config(
                cfg.messaging.sms_per_target.as_ref(),
                None,
                feature.and_then(|f| f.messaging.sms_per_target.as_ref()),
            ),
            Self::MessagingEmail => resolve_config(
                cfg.messaging.email_per_target.as_ref(),
                None,
                feature.and_then(|f| f.messaging.email_per_target.as_ref()),
            ),
            _ => None,
        }
    }

    /// Resolve this group plus request context into the concrete bucket
    /// specs to enforce, in order, with AND semantics.
    ///
    /// # Panics
    ///
    /// Panics when called on [`Self::AuthenticationGeneral`] (a pure
    /// fallback group) or when a channel-dispatched group is resolved
    /// without a channel in `opts` — both are wiring bugs, not runtime
    /// conditions.
    #[must_use]
    pub fn resolve_bucket_specs(
        self,
        cfg: &AppConfig,
        feature: Option<&FeatureConfig>,
        global: Option<&GlobalRateLimits>,
        opts: &ResolveOptions,
    ) -> Vec<BucketSpec> {
        let mut specs = Vec::new();

        let push_per_ip = |specs: &mut Vec<BucketSpec>, name: BucketName, args: Vec<String>| {
            if let Some(config) = self.per_ip_config(cfg, feature) {
                specs.push(BucketSpec::new(self, config, name, args));
            }
        };
        let push_per_user = |specs: &mut Vec<BucketSpec>, name: BucketName, extra: Vec<String>| {
            let (Some(config), Some(user_id)) = (self.per_user_config(cfg), opts.user_id.as_ref())
            else {
                return;
            };
            let mut args = vec![user_id.clone()];
            args.extend(extra);
            specs.push(BucketSpec::new(self, config, name, args));
        };
        let push_per_user_per_ip =
            |specs: &mut Vec<BucketSpec>, name: BucketName, extra: Vec<String>| {
                let (Some(config), Some(user_id)) =
                    (self.per_user_per_ip_config(cfg), opts.user_id.as_ref())
                else {
                    return;
                };
                let mut args = vec![user_id.clone()];
                args.extend(extra);
                specs.push(BucketSpec::new(self, config, name, args));
            };
        let push_per_target = |specs: &mut Vec<BucketSpec>, name: BucketName| {
            if let Some(config) = self.per_target_config(cfg, feature) {
                specs.push(BucketSpec::new(self, config, name, vec![opts.target.clone()]));
            }
        };

        match self {
            Self::AuthenticationGeneral => {
                panic!("{self} is a fallback group and has no buckets of its own");
            }

            Self::AuthenticationPassword => {
                push_per_ip(
                    &mut specs,
                    BucketName::VerifyPasswordPerIP,
                    vec![opts.ip_address.clone()],
                );
                push_per_user_per_ip(
                    &mut specs,
                    BucketName::VerifyPasswordPerUserPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationOobOtpEmailTrigger | Self::AuthenticationOobOtpSmsTrigger => {
                let per_ip = select_by_channel(
                    opts.channel,
                    BucketName::OOBOTPTriggerEmailPerIP,
                    BucketName::OOBOTPTriggerSMSPerIP,
                    BucketName::OOBOTPTriggerWhatsappPerIP,
                );
                push_per_ip(
                    &mut specs,
                    per_ip,
                    vec![opts.purpose.clone(), opts.ip_address.clone()],
                );

                let per_user = select_by_channel(
                    opts.channel,
                    BucketName::OOBOTPTriggerEmailPerUser,
                    BucketName::OOBOTPTriggerSMSPerUser,
                    BucketName::OOBOTPTriggerWhatsappPerUser,
                );
                push_per_user(&mut specs, per_user, vec![opts.purpose.clone()]);
            }

            Self::AuthenticationOobOtpEmailValidate | Self::AuthenticationOobOtpSmsValidate => {
                let per_ip = select_by_channel(
                    opts.channel,
                    BucketName::OOBOTPValidateEmailPerIP,
                    BucketName::OOBOTPValidateSMSPerIP,
                    BucketName::OOBOTPValidateWhatsappPerIP,
                );
                push_per_ip(
                    &mut specs,
                    per_ip,
                    vec![opts.purpose.clone(), opts.ip_address.clone()],
                );

                let per_user_per_ip = select_by_channel(
                    opts.channel,
                    BucketName::OOBOTPValidateEmailPerUserPerIP,
                    BucketName::OOBOTPValidateSMSPerUserPerIP,
                    BucketName::OOBOTPValidateWhatsappPerUserPerIP,
                );
                push_per_user_per_ip(
                    &mut specs,
                    per_user_per_ip,
                    vec![opts.ip_address.clone(), opts.purpose.clone()],
                );
            }

            Self::AuthenticationTotp => {
                push_per_ip(
                    &mut specs,
                    BucketName::VerifyTOTPPerIP,
                    vec![opts.ip_address.clone()],
                );
                push_per_user_per_ip(
                    &mut specs,
                    BucketName::VerifyTOTPPerUserPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationRecoveryCode => {
                push_per_ip(
                    &mut specs,
                    BucketName::VerifyRecoveryCodePerIP,
                    vec![opts.ip_address.clone()],
                );
                push_per_user_per_ip(
                    &mut specs,
                    BucketName::VerifyRecoveryCodePerUserPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationDeviceToken => {
                push_per_ip(
                    &mut specs,
                    BucketName::VerifyDeviceTokenPerIP,
                    vec![opts.ip_address.clone()],
                );
                push_per_user_per_ip(
                    &mut specs,
                    BucketName::VerifyDeviceTokenPerUserPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationPasskey => {
                push_per_ip(
                    &mut specs,
                    BucketName::VerifyPasskeyPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationSiwe => {
                push_per_ip(
                    &mut specs,
                    BucketName::VerifySIWEPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationSignup => {
                push_per_ip(
                    &mut specs,
                    BucketName::SignupPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationSignupAnonymous => {
                push_per_ip(
                    &mut specs,
                    BucketName::SignupAnonymousPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::AuthenticationAccountEnumeration => {
                push_per_ip(
                    &mut specs,
                    BucketName::AccountEnumerationPerIP,
                    vec![opts.ip_address.clone()],
                );
            }

            Self::VerificationEmailTrigger | Self::VerificationSmsTrigger => {
                let per_ip = select_by_channel(
                    opts.channel,
                    BucketName::VerificationTriggerEmailPerIP,
                    BucketName::VerificationTriggerSMSPerIP,
                    BucketName::VerificationTriggerWhatsappPerIP,
                );
                push_per_ip(&mut specs, per_ip, vec![opts.ip_address.clone()]);

                let per_user = select_by_channel(
                    opts.channel,
                    BucketName::VerificationTriggerEmailPerUser,
                    BucketName::VerificationTriggerSMSPerUser,
                    BucketName::VerificationTriggerWhatsappPerUser,
                );
                push_per_user(&mut specs, per_user, vec![]);
            }

            Self::VerificationEmailValidate | Self::VerificationSmsValidate => {
                let per_ip = select_by_channel(
                    opts.channel,
                    BucketName::VerificationValidateEmailPerIP,
                    BucketName::VerificationValidateSMSPerIP,
                    BucketName::VerificationValidateWhatsappPerIP,
                );
                push_per_ip(&mut specs, per_ip, vec![opts.ip_address.clone()]);
            }

            Self::ForgotPasswordEmailTrigger | Self::ForgotPasswordSmsTrigger => {
                let per_ip = select_by_channel(
                    opts.channel,
                    BucketName::ForgotPasswordTriggerEmailPerIP,
                    BucketName::ForgotPasswordTriggerSMSPerIP,
                    BucketName::ForgotPasswordTriggerWhatsappPerIP,
                );
                push_per_ip(&mut specs, per_ip, vec![opts.ip_address.clone()]);
            }

            Self::ForgotPasswordEmailValidate | Self::ForgotPasswordSmsValidate => {
                let per_ip = select_by_channel(
                    opts.channel,
                    BucketName::ForgotPasswordValidateEmailPerIP,
                    BucketName::ForgotPasswordValidateSMSPerIP,
                    BucketName::ForgotPasswordValidateWhatsappPerIP,
                );
                push_per_ip(&mut specs, per_ip, vec![opts.ip_address.clone()]);
            }

            Self::MessagingSms => {
                if let Some(config) = resolve_config(
                    cfg.messaging.sms.as_ref(),
                    None,
                    feature.and_then(|f| f.messaging.sms.as_ref()),
                ) {
                    specs.push(BucketSpec::new(self, config, BucketName::MessagingSMS, vec![]));
                }
                if let Some(global) = global {
                    specs.push(BucketSpec::global(
                        self,
                        &global.sms,
                        BucketName::MessagingSMS,
                        vec![],
                    ));
                }

                push_per_ip(
                    &mut specs,
                    BucketName::MessagingSMSPerIP,
                    vec![opts.ip_address.clone()],
                );
                if let Some(global) = global {
                    specs.push(BucketSpec::global(
                        self,
                        &global.sms_per_ip,
                        BucketName::MessagingSMSPerIP,
                        vec![opts.ip_address.clone()],
                    ));
                }

                push_per_target(&mut specs, BucketName::MessagingSMSPerTarget);
                if let Some(global) = global {
                    specs.push(BucketSpec::global(
                        self,
                        &global.sms_per_target,
                        BucketName::MessagingSMSPerTarget,
                        vec![opts.target.clone()],
                    ));
                }
            }

            Self::MessagingEmail => {
                if let Some(config) = resolve_config(
                    cfg.messaging.email.as_ref(),
                    None,
                    feature.and_then(|f| f.messaging.email.as_ref()),
                ) {
                    specs.push(BucketSpec::new(
                        self,
                        config,
                        BucketName::MessagingEmail,
                        vec![],
                    ));
                }
                if let Some(global) = global {
                    specs.push(BucketSpec::global(
                        self,
                        &global.email,
                        BucketName::MessagingEmail,
                        vec![],
                    ));
                }

                push_per_ip(
                    &mut specs,
                    BucketName::MessagingEmailPerIP,
                    vec![opts.ip_address.clone()],
                );
                if let Some(global) = global {
                    specs.push(BucketSpec::global(
                        self,
                        &global.email_per_ip,
                        BucketName::MessagingEmailPerIP,
                        vec![opts.ip_address.clone()],
                    ));
                }

                push_per_target(&mut specs, BucketName::MessagingEmailPerTarget);
                if let Some(global) = global {
                    specs.push(BucketSpec::global(
                        self,
                        &global.email_per_target,
                        BucketName::MessagingEmailPerTarget,
                        vec![opts.target.clone()],
                    ));
                }
            }

            Self::OAuthTokenClientCredentials => {
                // Built-in quotas, not operator-tunable.
                if let Some(client_id) = opts.client_id.as_ref() {
                    let per_client = RateLimitConfig::new(Duration::from_secs(60), 5);
                    specs.push(BucketSpec::new(
                        self,
                        &per_client,
                        BucketName::OAuthTokenClientCredentialsPerClient,
                        vec![client_id.clone()],
                    ));
                }
                let per_project = RateLimitConfig::new(Duration::from_secs(60), 20);
                specs.push(BucketSpec::new(
                    self,
                    &per_project,
                    BucketName::OAuthTokenClientCredentialsPerProject,
                    vec![],
                ));
            }
        }

        specs
    }

    /// Weight of one logical request against this group's buckets.
    ///
    /// Verify-style authentication groups fall back to the
    /// `authentication.general` weight; everything else uses its own entry
    /// or the default of 1. Negative weights clamp to zero.
    #[must_use]
    pub fn resolve_weight(self, weights: Option<&RateLimitWeights>) -> f64 {
        let Some(weights) = weights else {
            return 1.0;
        };

        let fallback = match self {
            Self::AuthenticationPassword
            | Self::AuthenticationOobOtpEmailValidate
            | Self::AuthenticationOobOtpSmsValidate
            | Self::AuthenticationTotp
            | Self::AuthenticationRecoveryCode
            | Self::AuthenticationDeviceToken
            | Self::AuthenticationPasskey
            | Self::AuthenticationSiwe => Some(Self::AuthenticationGeneral),
            _ => None,
        };

        weights
            .get(self)
            .or_else(|| fallback.and_then(|group| weights.get(group)))
            .unwrap_or(1.0)
            .max(0.0)
    }
}

impl fmt::Display for RateLimitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn select_by_channel(
    channel: Option<Channel>,
    email: BucketName,
    sms: BucketName,
    whatsapp: BucketName,
) -> BucketName {
    match channel {
        Some(Channel::Email) => email,
        Some(Channel::Sms) => sms,
        Some(Channel::Whatsapp) => whatsapp,
        None => panic!("rate limit group requires a delivery channel"),
    }
}

/// Pick the effective config for one dimension.
///
/// The fallback only applies while the primary entry is unspecified; an
/// explicit `enabled` value (true or false) pins the primary. A feature cap
/// displaces whatever was picked when it defines a lower rate than the
/// primary.
fn resolve_config<'a>(
    config: Option<&'a RateLimitConfig>,
    fallback: Option<&'a RateLimitConfig>,
    feature: Option<&'a RateLimitConfig>,
) -> Option<&'a RateLimitConfig> {
    let unspecified = config.is_none_or(|c| c.enabled.is_none());
    let mut effective = if unspecified {
        fallback.or(config)
    } else {
        config
    };

    if let (Some(feature), Some(base)) = (feature, config) {
        if feature.rate() < base.rate() {
            effective = Some(feature);
        }
    }

    effective
}
