//! Billing Scenario Tests
//!
//! End-to-end checks of the estimate pipeline through the public API:
//! rate table, VIP model, estimator and the clock-injected service.

use std::sync::Arc;

use xywow_core::application::{EstimatorService, MemberCard};
use xywow_core::domain::{
    base_cost, discount_factor, estimate, vip_level, AccountSnapshot, AccountStanding, DomainError,
    Session, TieredRateTable, UNDER_ONE_MINUTE_LABEL,
};
use xywow_core::port::FixedTimeProvider;
use xywow_core::AppError;

const T: i64 = 1_700_000_000_000;
const MINUTE: i64 = 60_000;
const HOUR: i64 = 60 * MINUTE;

fn assert_money(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_base_cost_table() {
    assert_money(base_cost(0), 0.0);
    assert_money(base_cost(3), 24.0);
    assert_money(base_cost(6), 42.0);
    assert_money(base_cost(10), 62.0);
    assert_money(base_cost(100), 512.0);
}

#[test]
fn test_vip_levels_and_factors() {
    assert_eq!(vip_level(0.0), 0);
    assert_eq!(vip_level(49.0), 0);
    assert_eq!(vip_level(50.0), 1);
    assert_eq!(vip_level(5000.0), 100);
    assert_eq!(vip_level(10000.0), 100);

    assert_money(discount_factor(0), 1.0);
    assert_money(discount_factor(100), 0.5);
    for level in 0..100u8 {
        assert!(discount_factor(level) >= discount_factor(level + 1));
    }
}

#[test]
fn test_amount_never_exceeds_base_cost() {
    let standings = [
        AccountStanding::full_price(),
        AccountStanding::new(120.0, 0.95).unwrap(),
        AccountStanding::new(2500.0, 0.9).unwrap(),
        AccountStanding::new(9000.0, 0.0).unwrap(),
    ];

    for minutes in [0, 1, 59, 60, 61, 179, 361, 600, 1441] {
        let session = Session::new(T, T + minutes * MINUTE);
        for standing in &standings {
            let result = estimate(&session, standing).unwrap();
            assert!(result.amount_due >= 0.0);
            assert!(result.amount_due <= base_cost(result.billable_hours) + 1e-9);
        }
    }
}

/// 2h30m, new member: three billable hours at the first tier
#[test]
fn test_two_and_a_half_hours_full_price() {
    let session = Session::new(T, T + 2 * HOUR + 30 * MINUTE);
    let result = estimate(&session, &AccountStanding::full_price()).unwrap();

    assert_eq!(result.billable_hours, 3);
    assert_money(result.base_cost, 24.0);
    assert_money(result.vip_factor, 1.0);
    assert_money(result.amount_due, 24.0);
    assert_eq!(result.elapsed_label, "2小时 30分钟");
    assert_eq!(result.display_amount(), "￥24.00");
}

/// Reference time before entry clamps to zero instead of failing
#[test]
fn test_clock_skew_clamps_to_zero() {
    let session = Session::new(T, T - 5 * MINUTE);
    let result = estimate(&session, &AccountStanding::full_price()).unwrap();

    assert_eq!(result.billable_hours, 0);
    assert_money(result.amount_due, 0.0);
    assert_eq!(result.elapsed_label, UNDER_ONE_MINUTE_LABEL);
}

/// VIP 50 with a 0.9 account discount over ten hours
#[test]
fn test_vip_and_account_discount_compound() {
    let session = Session::new(T, T + 10 * HOUR);
    let standing = AccountStanding::new(2500.0, 0.9).unwrap();
    let result = estimate(&session, &standing).unwrap();

    assert_eq!(result.vip_level, 50);
    assert_money(result.vip_factor, 0.75);
    assert_money(result.base_cost, 62.0);
    assert_money(result.amount_due, 41.85);
    assert_eq!(result.display_amount(), "￥41.85");
}

#[test]
fn test_estimate_is_idempotent() {
    let session = Session::new(T, T + 7 * HOUR + 1);
    let standing = AccountStanding::new(800.0, 0.85).unwrap();

    let first = estimate(&session, &standing).unwrap();
    let second = estimate(&session, &standing).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_service_uses_injected_clock() {
    let clock = Arc::new(FixedTimeProvider::new(T + 90 * MINUTE));
    let service = EstimatorService::new(clock.clone());
    let snapshot = AccountSnapshot {
        enter_timestamp: Some(T),
        consumption: Some(0.0),
        discount: Some(1.0),
        ..Default::default()
    };

    let result = service.estimate_snapshot(&snapshot).unwrap().unwrap();
    assert_eq!(result.billable_hours, 2);
    assert_money(result.amount_due, 16.0);

    clock.advance(5 * HOUR);
    let result = service.estimate_snapshot(&snapshot).unwrap().unwrap();
    assert_eq!(result.billable_hours, 7);
    assert_money(result.amount_due, 47.0);
}

#[test]
fn test_not_in_venue_has_no_estimate() {
    let service = EstimatorService::new(Arc::new(FixedTimeProvider::new(T)));
    let snapshot = AccountSnapshot {
        consumption: Some(300.0),
        discount: Some(1.0),
        ..Default::default()
    };
    assert!(service.estimate_snapshot(&snapshot).unwrap().is_none());
}

#[test]
fn test_bad_timestamps_are_rejected_not_zeroed() {
    let service = EstimatorService::new(Arc::new(FixedTimeProvider::new(T)));
    let standing = AccountStanding::full_price();

    for raw in ["", "   ", "abc", "12.5", "1e12"] {
        let err = service.estimate_raw(raw, &standing).unwrap_err();
        assert!(err.is_invalid_input(), "{:?} should be rejected", raw);
    }

    let ok = service
        .estimate_raw(&(T - HOUR).to_string(), &standing)
        .unwrap();
    assert_money(ok.amount_due, 8.0);
}

#[test]
fn test_missing_standing_fields_are_rejected() {
    let service = EstimatorService::new(Arc::new(FixedTimeProvider::new(T)));
    let snapshot = AccountSnapshot {
        enter_timestamp: Some(T - HOUR),
        consumption: Some(100.0),
        discount: None,
        ..Default::default()
    };

    match service.estimate_snapshot(&snapshot) {
        Err(AppError::Domain(DomainError::InvalidInput(msg))) => {
            assert!(msg.contains("discount"))
        }
        other => panic!("expected invalid input, got {:?}", other),
    }
}

#[test]
fn test_member_card_projection() {
    let service = EstimatorService::new(Arc::new(FixedTimeProvider::new(T + 4 * HOUR)));
    let snapshot: AccountSnapshot = serde_json::from_value(serde_json::json!({
        "userId": "10001",
        "nickname": "kiri",
        "enterTimestamp": T,
        "consumption": 120,
        "discount": 1,
        "balance": 88.5,
        "playCount": 12
    }))
    .unwrap();

    let card = MemberCard::project(&snapshot, &service).unwrap();
    assert_eq!(card.vip.level, 2);
    assert_eq!(card.progress_label(), "120/150 RMB");
    assert_eq!(card.discount_label, "9.9折");
    assert_eq!(card.balance_label(), "￥88.50");
    assert!(card.in_venue);

    let live = card.live_estimate.unwrap();
    assert_eq!(live.billable_hours, 4);
    assert_money(live.amount_due, 30.0 * 0.99);
}

#[test]
fn test_breakdown_matches_base_cost() {
    let table = TieredRateTable::venue();
    for hours in [0, 1, 3, 4, 6, 7, 10, 100] {
        let sum: f64 = table.breakdown(hours).iter().map(|c| c.subtotal).sum();
        assert_money(sum, table.base_cost(hours));
    }
}
