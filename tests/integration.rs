//! End-to-end tests: policy resolution through the limiter to storage.
//!
//! Everything runs against the in-memory backend with a manual clock, so
//! refill timing is exact and deterministic.

use std::sync::Arc;
use std::time::Duration;

use fleet_ratelimit::{
    AppConfig, BucketName, BucketSpec, Channel, Limiter, ManualClock, MemoryStorage,
    RateLimitConfig, RateLimitGroup, RateLimitWeights, Reservation, ReserveOutcome,
    ResolveOptions,
};

fn harness() -> (Arc<ManualClock>, Arc<MemoryStorage>, Limiter) {
    let clock = Arc::new(ManualClock::starting_at(0));
    let storage = Arc::new(MemoryStorage::with_clock(clock.clone()));
    let limiter = Limiter::new(storage.clone());
    (clock, storage, limiter)
}

fn spec(name: BucketName, period_secs: u64, burst: u32) -> BucketSpec {
    BucketSpec::new(
        RateLimitGroup::AuthenticationPassword,
        &RateLimitConfig::new(Duration::from_secs(period_secs), burst),
        name,
        vec!["1.2.3.4".to_owned()],
    )
}

#[tokio::test]
async fn tokens_refill_one_emission_interval_at_a_time() {
    let (clock, _, limiter) = harness();
    // 4 tokens per 20s: one token refills every 5s.
    let spec = spec(BucketName::VerifyPasswordPerIP, 20, 4);

    for _ in 0..4 {
        assert!(limiter.allow(&spec).await.unwrap().is_none());
    }

    let denied = limiter.allow(&spec).await.unwrap().expect("burst spent");
    assert_eq!(denied.time_to_act(), 5_000);

    // One interval later exactly one token is back.
    clock.advance(Duration::from_secs(5));
    assert!(limiter.allow(&spec).await.unwrap().is_none());
    let denied = limiter.allow(&spec).await.unwrap().expect("still spent");
    assert_eq!(denied.time_to_act(), 10_000);

    // A full period of idleness restores the whole burst, and no more.
    clock.advance(Duration::from_secs(20));
    for _ in 0..4 {
        assert!(limiter.allow(&spec).await.unwrap().is_none());
    }
    assert!(limiter.allow(&spec).await.unwrap().is_some());
}

#[tokio::test]
async fn multi_bucket_checks_roll_back_on_partial_denial() {
    let (_, _, limiter) = harness();

    // Two buckets guarding the same operation: the second is much tighter.
    let wide = spec(BucketName::VerifyPasswordPerIP, 20, 4);
    let tight = spec(BucketName::VerifyPasswordPerUserPerIP, 20, 1);
    let specs = [&wide, &tight];

    // Reserve across all specs; on a denial, cancel what was taken so the
    // failed attempt costs nothing in the other buckets.
    async fn reserve_all(
        limiter: &Limiter,
        specs: &[&BucketSpec],
    ) -> Result<Vec<Reservation>, BucketName> {
        let mut taken: Vec<Reservation> = Vec::new();
        for spec in specs {
            match limiter.reserve(spec).await.unwrap() {
                ReserveOutcome::Conforming(reservation) => taken.push(reservation),
                ReserveOutcome::Limited(failed) => {
                    for reservation in &mut taken {
                        limiter.cancel(reservation).await;
                    }
                    return Err(failed.bucket_name());
                }
            }
        }
        Ok(taken)
    }

    let wide_baseline = limiter.get_time_to_act(&wide).await.unwrap();

    assert!(reserve_all(&limiter, &specs).await.is_ok());
    let wide_after_one = limiter.get_time_to_act(&wide).await.unwrap();
    assert!(wide_after_one > wide_baseline);

    // Second attempt: the tight bucket denies and the wide bucket's token
    // comes back.
    let denied_by = reserve_all(&limiter, &specs).await.unwrap_err();
    assert_eq!(denied_by, BucketName::VerifyPasswordPerUserPerIP);
    assert_eq!(limiter.get_time_to_act(&wide).await.unwrap(), wide_after_one);
}

#[tokio::test]
async fn policy_resolution_drives_the_limiter() {
    let (_, _, limiter) = harness();

    // Password has no config of its own; both dimensions fall back to
    // authentication.general.
    let mut cfg = AppConfig::default();
    cfg.authentication.general.per_ip =
        Some(RateLimitConfig::new(Duration::from_secs(60), 3));
    cfg.authentication.general.per_user_per_ip =
        Some(RateLimitConfig::new(Duration::from_secs(60), 2));

    let opts = ResolveOptions {
        ip_address: "1.2.3.4".to_owned(),
        user_id: Some("user-1".to_owned()),
        ..ResolveOptions::default()
    };
    let specs =
        RateLimitGroup::AuthenticationPassword.resolve_bucket_specs(&cfg, None, None, &opts);
    assert_eq!(specs.len(), 2);

    // The per-user-per-IP burst of 2 is the binding constraint.
    for attempt in 0..3 {
        let mut denials = Vec::new();
        for spec in &specs {
            if let Some(failed) = limiter.allow(spec).await.unwrap() {
                denials.push(failed.bucket_name());
            }
        }
        if attempt < 2 {
            assert!(denials.is_empty(), "attempt {attempt} should conform");
        } else {
            assert_eq!(denials, vec![BucketName::VerifyPasswordPerUserPerIP]);
        }
    }
}

#[tokio::test]
async fn disabled_dimension_never_reaches_storage() {
    let (_, storage, limiter) = harness();

    // Explicitly disabled per-IP entry: the spec exists but is a no-op, and
    // the general fallback must not resurrect it.
    let mut cfg = AppConfig::default();
    cfg.authentication.password.per_ip = Some(RateLimitConfig {
        enabled: Some(false),
        period: Duration::from_secs(60),
        burst: 1,
    });
    cfg.authentication.general.per_ip =
        Some(RateLimitConfig::new(Duration::from_secs(60), 1));

    let opts = ResolveOptions {
        ip_address: "1.2.3.4".to_owned(),
        ..ResolveOptions::default()
    };
    let specs =
        RateLimitGroup::AuthenticationPassword.resolve_bucket_specs(&cfg, None, None, &opts);
    assert_eq!(specs.len(), 1);

    for _ in 0..10 {
        assert!(limiter.allow(&specs[0]).await.unwrap().is_none());
    }
    assert!(storage.is_empty());
}

#[tokio::test]
async fn weighted_flows_share_one_budget() {
    let (_, _, limiter) = harness();

    // TOTP inherits the general weight of 2, so a 4-token bucket covers two
    // verification attempts.
    let mut weights = RateLimitWeights::new();
    weights.set(RateLimitGroup::AuthenticationGeneral, 2.0);

    let spec = BucketSpec::new(
        RateLimitGroup::AuthenticationTotp,
        &RateLimitConfig::new(Duration::from_secs(20), 4),
        BucketName::VerifyTOTPPerIP,
        vec!["1.2.3.4".to_owned()],
    );

    for _ in 0..2 {
        assert!(limiter
            .reserve_weighted(&spec, &weights)
            .await
            .unwrap()
            .is_conforming());
    }
    assert!(!limiter
        .reserve_weighted(&spec, &weights)
        .await
        .unwrap()
        .is_conforming());
}

#[tokio::test]
async fn otp_validate_releases_quota_when_the_code_is_right() {
    let (_, _, limiter) = harness();

    let mut cfg = AppConfig::default();
    cfg.authentication.oob_otp.sms.validate_per_ip =
        Some(RateLimitConfig::new(Duration::from_secs(60), 2));

    let opts = ResolveOptions {
        ip_address: "1.2.3.4".to_owned(),
        purpose: "login".to_owned(),
        channel: Some(Channel::Sms),
        ..ResolveOptions::default()
    };
    let specs = RateLimitGroup::AuthenticationOobOtpSmsValidate
        .resolve_bucket_specs(&cfg, None, None, &opts);
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].name, BucketName::OOBOTPValidateSMSPerIP);
    assert_eq!(
        specs[0].arguments,
        vec!["login".to_owned(), "1.2.3.4".to_owned()]
    );

    // Correct codes cancel their reservation, so only wrong attempts count
    // against the quota.
    for _ in 0..5 {
        let mut reservation = limiter
            .reserve(&specs[0])
            .await
            .unwrap()
            .into_result()
            .unwrap();
        limiter.cancel(&mut reservation).await;
    }

    // Wrong attempts keep their tokens and exhaust the burst of 2.
    for _ in 0..2 {
        let mut reservation = limiter
            .reserve(&specs[0])
            .await
            .unwrap()
            .into_result()
            .unwrap();
        reservation.prevent_cancel();
        limiter.cancel(&mut reservation).await;
    }
    assert!(limiter.allow(&specs[0]).await.unwrap().is_some());
}

#[tokio::test]
async fn get_time_to_act_is_a_pure_observation() {
    let (_, _, limiter) = harness();
    let spec = spec(BucketName::VerifyPasswordPerIP, 20, 2);

    let before = limiter.get_time_to_act(&spec).await.unwrap();
    // Observing repeatedly consumes nothing.
    for _ in 0..10 {
        assert_eq!(limiter.get_time_to_act(&spec).await.unwrap(), before);
    }

    assert!(limiter.allow(&spec).await.unwrap().is_none());
    assert!(limiter.allow(&spec).await.unwrap().is_none());
    assert!(limiter.allow(&spec).await.unwrap().is_some());

    // With the burst spent the advisory instant moves into the future.
    assert!(limiter.get_time_to_act(&spec).await.unwrap() > 0);
}
