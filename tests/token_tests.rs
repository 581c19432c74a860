//! Integration tests for the opaque token subsystem.

use std::thread;
use std::time::Duration;

use chrono::Utc;

use sealbox::tokens::{
    CheckOutcome, IssuedToken, MemoryTokenBackend, TokenService, TokenType, TOKEN_LENGTH,
};
use sealbox::{SealboxError, Settings};

fn service() -> TokenService<MemoryTokenBackend> {
    TokenService::new(MemoryTokenBackend::new(), "test-fingerprint-salt").unwrap()
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

#[test]
fn generated_plaintext_is_never_persisted() {
    let svc = service();
    let IssuedToken { token, record } = svc
        .generate(TokenType::Verification, "u1", None, None)
        .unwrap();

    assert_eq!(token.len(), TOKEN_LENGTH);
    assert_ne!(record.token, token);
    assert!(!record.token.contains(&token));
    // The fingerprint is a hex SHA-256 digest.
    assert_eq!(record.token.len(), 64);
    assert!(record.token.bytes().all(|b| b.is_ascii_hexdigit()));
}

#[test]
fn generated_tokens_are_unique() {
    let svc = service();
    let a = svc.generate(TokenType::ApiKey, "u1", Some("ci key"), None).unwrap();
    let b = svc.generate(TokenType::ApiKey, "u1", Some("ci key"), None).unwrap();
    assert_ne!(a.token, b.token);
    assert_ne!(a.record.token, b.record.token);
}

#[test]
fn empty_owner_is_rejected() {
    let svc = service();
    let err = svc
        .generate(TokenType::Verification, "", None, None)
        .unwrap_err();
    assert!(matches!(err, SealboxError::Validation { field: "owner", .. }));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn check_finds_a_valid_token() {
    let svc = service();
    let issued = svc
        .generate(TokenType::Verification, "u1", None, None)
        .unwrap();

    let outcome = svc
        .check(TokenType::Verification, &issued.token, Some("u1"), false)
        .unwrap();
    match outcome {
        CheckOutcome::Valid(record) => {
            assert_eq!(record.owner, "u1");
            assert!(record.last_used_at.is_none());
        }
        other => panic!("expected Valid, got {other:?}"),
    }
}

#[test]
fn unknown_plaintext_is_not_found() {
    let svc = service();
    svc.generate(TokenType::Verification, "u1", None, None)
        .unwrap();

    let outcome = svc
        .check(TokenType::Verification, "not-a-real-token", None, false)
        .unwrap();
    assert!(matches!(outcome, CheckOutcome::NotFound));
}

#[test]
fn wrong_type_is_not_found() {
    let svc = service();
    let issued = svc
        .generate(TokenType::Verification, "u1", None, None)
        .unwrap();

    let outcome = svc
        .check(TokenType::PasswordReset, &issued.token, None, false)
        .unwrap();
    assert!(matches!(outcome, CheckOutcome::NotFound));
}

#[test]
fn owner_mismatch_is_indistinguishable_from_not_found() {
    let svc = service();
    let issued = svc
        .generate(TokenType::Passwordless, "u1", None, None)
        .unwrap();

    let outcome = svc
        .check(TokenType::Passwordless, &issued.token, Some("u2"), false)
        .unwrap();
    assert!(matches!(outcome, CheckOutcome::NotFound));
}

#[test]
fn expired_token_is_invalid_even_with_correct_owner() {
    let svc = service();
    let issued = svc
        .generate(TokenType::Verification, "u1", None, Some(now_ms() - 1_000))
        .unwrap();

    let outcome = svc
        .check(TokenType::Verification, &issued.token, Some("u1"), false)
        .unwrap();
    assert!(matches!(outcome, CheckOutcome::Expired));
}

#[test]
fn mark_used_touches_last_used_at() {
    let svc = service();
    let issued = svc
        .generate(TokenType::ApiKey, "u1", Some("ci key"), None)
        .unwrap();

    let before = now_ms();
    let outcome = svc
        .check(TokenType::ApiKey, &issued.token, None, true)
        .unwrap();
    match outcome {
        CheckOutcome::Valid(record) => {
            let used = record.last_used_at.expect("last_used_at must be set");
            assert!(used >= before);
        }
        other => panic!("expected Valid, got {other:?}"),
    }

    // The touch persisted.
    match svc.check(TokenType::ApiKey, &issued.token, None, false).unwrap() {
        CheckOutcome::Valid(record) => assert!(record.last_used_at.is_some()),
        other => panic!("expected Valid, got {other:?}"),
    }
}

#[test]
fn remove_is_a_noop_when_absent() {
    let svc = service();
    assert!(svc
        .remove(TokenType::Verification, "never-issued")
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Expiry sweep
// ---------------------------------------------------------------------------

#[test]
fn clear_expired_removes_exactly_the_expired_tokens() {
    let svc = service();
    svc.generate(TokenType::Verification, "u1", None, Some(now_ms() - 10))
        .unwrap();
    svc.generate(TokenType::Verification, "u2", None, Some(now_ms() - 10))
        .unwrap();
    let live = svc
        .generate(TokenType::Verification, "u3", None, Some(now_ms() + 60_000))
        .unwrap();
    let forever = svc
        .generate(TokenType::ApiKey, "u4", None, None)
        .unwrap();

    assert_eq!(svc.clear_expired().unwrap(), 2);

    // Survivors are untouched.
    assert!(svc
        .check(TokenType::Verification, &live.token, None, false)
        .unwrap()
        .is_valid());
    assert!(svc
        .check(TokenType::ApiKey, &forever.token, None, false)
        .unwrap()
        .is_valid());

    // A second sweep removes nothing.
    assert_eq!(svc.clear_expired().unwrap(), 0);
}

// ---------------------------------------------------------------------------
// End-to-end lifecycle
// ---------------------------------------------------------------------------

#[test]
fn verification_token_lifecycle() {
    let svc = service();
    let issued = svc
        .generate(TokenType::Verification, "u1", None, Some(now_ms() + 250))
        .unwrap();

    // Immediately valid.
    assert!(svc
        .check(TokenType::Verification, &issued.token, Some("u1"), false)
        .unwrap()
        .is_valid());

    // Past the deadline it is expired, not missing.
    thread::sleep(Duration::from_millis(300));
    assert!(matches!(
        svc.check(TokenType::Verification, &issued.token, Some("u1"), false)
            .unwrap(),
        CheckOutcome::Expired
    ));

    // After removal it is gone entirely.
    svc.remove(TokenType::Verification, &issued.token).unwrap();
    assert!(matches!(
        svc.check(TokenType::Verification, &issued.token, Some("u1"), false)
            .unwrap(),
        CheckOutcome::NotFound
    ));
}

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

#[test]
fn service_cannot_be_built_without_a_salt() {
    assert!(matches!(
        TokenService::new(MemoryTokenBackend::new(), ""),
        Err(SealboxError::Config(_))
    ));
}

#[test]
fn settings_wire_the_salt_into_the_service() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(".sealbox.toml"),
        "[tokens]\nsalt = \"from-config\"\n",
    )
    .unwrap();

    let settings = Settings::load(tmp.path()).unwrap();
    let salt = settings.require_token_salt().unwrap();
    assert!(TokenService::new(MemoryTokenBackend::new(), &salt).is_ok());
}
