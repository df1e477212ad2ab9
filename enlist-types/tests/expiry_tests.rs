use chrono::{Duration, TimeZone, Utc};
use enlist_types::{Account, AccountId, ActivationRecord, ActivationToken, ActivationWindow};

fn record_issued_at(issued_at: chrono::DateTime<Utc>, token: ActivationToken) -> ActivationRecord {
    ActivationRecord {
        account: Account {
            id: AccountId::new(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "opaque".into(),
            is_active: false,
            date_joined: issued_at,
        },
        token,
    }
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

#[test]
fn expires_exactly_at_boundary() {
    let window = ActivationWindow::days(7);
    let record = record_issued_at(now() - Duration::days(7), ActivationToken::generate("alice"));
    assert!(window.is_expired(&record, now()));
}

#[test]
fn live_one_second_before_boundary() {
    let window = ActivationWindow::days(7);
    let issued = now() - Duration::days(7) + Duration::seconds(1);
    let record = record_issued_at(issued, ActivationToken::generate("alice"));
    assert!(!window.is_expired(&record, now()));
}

#[test]
fn fresh_token_is_live() {
    let window = ActivationWindow::days(7);
    let record = record_issued_at(now(), ActivationToken::generate("alice"));
    assert!(!window.is_expired(&record, now()));
}

#[test]
fn sentinel_is_always_expired() {
    let window = ActivationWindow::days(7);
    let record = record_issued_at(now(), ActivationToken::activated());
    assert!(window.is_expired(&record, now()));
}

#[test]
fn zero_day_window_expires_immediately() {
    let window = ActivationWindow::days(0);
    let record = record_issued_at(now(), ActivationToken::generate("alice"));
    assert!(window.is_expired(&record, now()));
}

#[test]
fn cutoff_matches_has_elapsed() {
    let window = ActivationWindow::days(3);
    let cutoff = window.cutoff(now());
    assert!(window.has_elapsed(cutoff, now()));
    assert!(!window.has_elapsed(cutoff + Duration::microseconds(1), now()));
}

#[test]
fn default_window_is_one_week() {
    assert_eq!(ActivationWindow::default().as_days(), 7);
}

#[test]
fn cutoff_saturates_for_huge_window() {
    let window = ActivationWindow::days(u32::MAX);
    assert_eq!(window.cutoff(now()), chrono::DateTime::<Utc>::MIN_UTC);
}

#[test]
fn huge_window_never_elapses() {
    let window = ActivationWindow::days(u32::MAX);
    let record = record_issued_at(now(), ActivationToken::generate("alice"));
    assert!(!window.has_elapsed(now(), now()));
    assert!(!window.is_expired(&record, now()));
}
