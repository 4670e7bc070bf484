//! Bulk PIN generation: validation, uniqueness, redraws and atomicity.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use turnstile_core::domain::pins::{CodeAlphabet, PinGenerator, PinPolicy};
use turnstile_core::domain::repositories::PinUserRepository;
use turnstile_core::error::{GenerationError, StoreError};
use turnstile_model::{StatusFilter, SubscriptionType};

mod support;

use support::{
    ConstantCodeSource, Harness, RacingRepository, ScriptedCodeSource,
    UnavailableRepository, t0,
};

#[tokio::test]
async fn generates_requested_count_of_distinct_codes() {
    let harness = Harness::new();
    let codes = harness
        .generator()
        .generate(250, SubscriptionType::Monthly)
        .await
        .unwrap();

    assert_eq!(codes.len(), 250);
    let unique: HashSet<&String> = codes.iter().collect();
    assert_eq!(unique.len(), 250);
    assert!(codes.iter().all(|code| code.len() == 10));
    assert_eq!(harness.users.len(), 250);
}

#[tokio::test]
async fn codes_are_returned_in_generation_order() {
    let harness = Harness::new();
    let source = Arc::new(ScriptedCodeSource::new(["111111", "222222", "333333"]));
    let codes = harness
        .generator_with(source, PinPolicy::default())
        .generate(3, SubscriptionType::Weekly)
        .await
        .unwrap();

    assert_eq!(codes, vec!["111111", "222222", "333333"]);
}

#[tokio::test]
async fn records_carry_tier_and_expiration() {
    let harness = Harness::new();
    let codes = harness
        .generator()
        .generate(2, SubscriptionType::SixHours)
        .await
        .unwrap();

    for code in &codes {
        let user = harness.users.find_by_pin(code).await.unwrap().unwrap();
        assert_eq!(user.subscription_type, SubscriptionType::SixHours);
        assert_eq!(user.expiration_date, Some(t0() + Duration::hours(6)));
        assert!(!user.is_administrator);
        assert!(user.username.starts_with("pin_"));
        assert_eq!(user.created_at, t0());
    }
}

#[tokio::test]
async fn lifetime_pins_have_no_expiration() {
    let harness = Harness::new();
    let codes = harness
        .generator()
        .generate(1, SubscriptionType::Lifetime)
        .await
        .unwrap();

    let user = harness.users.find_by_pin(&codes[0]).await.unwrap().unwrap();
    assert_eq!(user.expiration_date, None);
}

#[tokio::test]
async fn out_of_range_counts_are_rejected_before_any_write() {
    let harness = Harness::new();
    let generator = harness.generator();

    for count in [-1, 0, 1001, 1500] {
        let err = generator
            .generate(count, SubscriptionType::Weekly)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidCount { .. }));
        assert!(err.is_validation());
    }
    assert!(harness.users.is_empty());
}

#[tokio::test]
async fn none_tier_is_rejected() {
    let harness = Harness::new();
    let err = harness
        .generator()
        .generate(5, SubscriptionType::None)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::InvalidTier(_)));
    assert!(harness.users.is_empty());
}

#[tokio::test]
async fn collisions_within_a_batch_are_redrawn() {
    let harness = Harness::new();
    let source = Arc::new(ScriptedCodeSource::new([
        "111111", "111111", "111111", "222222",
    ]));
    let codes = harness
        .generator_with(source.clone(), PinPolicy::default())
        .generate(2, SubscriptionType::Weekly)
        .await
        .unwrap();

    assert_eq!(codes, vec!["111111", "222222"]);
    assert_eq!(source.remaining(), 0);
}

#[tokio::test]
async fn codes_already_in_the_store_are_never_reissued() {
    let harness = Harness::new();
    let first = harness
        .generator_with(
            Arc::new(ScriptedCodeSource::new(["555555"])),
            PinPolicy::default(),
        )
        .generate(1, SubscriptionType::Weekly)
        .await
        .unwrap();
    assert_eq!(first, vec!["555555"]);

    // Expire the first holder: its code must still never come back.
    harness.clock.advance(Duration::days(30));

    let second = harness
        .generator_with(
            Arc::new(ScriptedCodeSource::new(["555555", "666666"])),
            PinPolicy::default(),
        )
        .generate(1, SubscriptionType::Weekly)
        .await
        .unwrap();
    assert_eq!(second, vec!["666666"]);
    assert_eq!(harness.users.len(), 2);
}

#[tokio::test]
async fn exhausted_redraw_budget_fails_whole_batch() {
    let harness = Harness::new();
    let policy = PinPolicy {
        length: 6,
        alphabet: CodeAlphabet::Numeric,
        max_redraws: 4,
    };
    let err = harness
        .generator_with(Arc::new(ConstantCodeSource("777777")), policy)
        .generate(3, SubscriptionType::Weekly)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Exhausted {
            slot: 1,
            attempts: 5
        }
    ));
    assert!(harness.users.is_empty());
}

#[tokio::test]
async fn lost_uniqueness_race_redraws_and_retries() {
    let harness = Harness::new();
    let racing = Arc::new(RacingRepository::new(harness.users.clone(), "888888", 1));
    let generator = PinGenerator::new(
        racing,
        Arc::new(ScriptedCodeSource::new(["888888", "999999", "121212"])),
        harness.clock(),
        PinPolicy::default(),
    );

    let codes = generator
        .generate(2, SubscriptionType::Yearly)
        .await
        .unwrap();

    assert_eq!(codes, vec!["121212", "999999"]);
    assert_eq!(harness.users.len(), 2);
    assert!(harness.users.find_by_pin("888888").await.unwrap().is_none());
}

#[tokio::test]
async fn store_failure_surfaces_as_store_error() {
    let harness = Harness::new();
    let generator = PinGenerator::new(
        Arc::new(UnavailableRepository),
        Arc::new(ScriptedCodeSource::new(["131313"])),
        harness.clock(),
        PinPolicy::default(),
    );

    let err = generator
        .generate(1, SubscriptionType::Weekly)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Store(StoreError::Unavailable(_))
    ));
    assert!(!err.is_validation());
}

#[tokio::test]
async fn full_batch_of_one_thousand() {
    let harness = Harness::new();
    let codes = harness
        .generator()
        .generate(1000, SubscriptionType::TwelveHours)
        .await
        .unwrap();
    assert_eq!(codes.len(), 1000);

    let listed = harness
        .directory()
        .list(StatusFilter::All, Some(SubscriptionType::TwelveHours))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1000);
}
