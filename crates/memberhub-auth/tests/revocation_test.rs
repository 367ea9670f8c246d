//! Integration tests for token validation against the revocation list.

mod helpers;

use memberhub_auth::{AuthError, AuxiliaryClaims, TokenRejection, TokenType};
use memberhub_core::config::AuthConfig;
use memberhub_core::types::id::MemberId;

use helpers::{SECRET, TestApp};

#[tokio::test]
async fn test_revoked_until_natural_expiry_then_expired() {
    let app = TestApp::new();
    let member = app.create_member("lim@example.com").await;
    let tokens = app.auth.login(member, SECRET).await.unwrap().tokens;
    let token = &tokens.access_token;

    app.auth.revoke_token(token).await.unwrap();
    assert_eq!(app.cache.live_entries(), 1);

    // Still revoked late in the token's life and inside the grace window.
    app.advance(chrono::Duration::seconds(3_600 - 1));
    assert!(matches!(
        app.auth.validate_token(token).await.unwrap_err(),
        AuthError::Rejected(TokenRejection::Revoked)
    ));
    app.advance(chrono::Duration::seconds(4));
    assert!(matches!(
        app.auth.validate_token(token).await.unwrap_err(),
        AuthError::Rejected(TokenRejection::Revoked)
    ));

    // Past exp + leeway the entry is gone and plain expiry takes over.
    app.advance(chrono::Duration::seconds(2));
    assert_eq!(app.cache.live_entries(), 0);
    assert!(matches!(
        app.auth.validate_token(token).await.unwrap_err(),
        AuthError::Rejected(TokenRejection::Expired)
    ));
}

#[tokio::test]
async fn test_revoking_one_token_leaves_others_valid() {
    let app = TestApp::new();
    let member = app.create_member("oh@example.com").await;
    let first = app.auth.login(member, SECRET).await.unwrap().tokens;
    let second = app.auth.login(member, SECRET).await.unwrap().tokens;

    app.auth.revoke_token(&first.access_token).await.unwrap();

    assert!(app.auth.validate_token(&second.access_token).await.is_ok());
    assert!(app.auth.validate_token(&first.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let app = TestApp::new();
    let member = app.create_member("shin@example.com").await;
    let tokens = app.auth.login(member, SECRET).await.unwrap().tokens;

    app.auth.revoke_token(&tokens.access_token).await.unwrap();
    app.advance(chrono::Duration::minutes(5));
    app.auth.revoke_token(&tokens.access_token).await.unwrap();

    assert_eq!(app.cache.live_entries(), 1);
    assert!(matches!(
        app.auth.validate_token(&tokens.access_token).await.unwrap_err(),
        AuthError::Rejected(TokenRejection::Revoked)
    ));
}

#[tokio::test]
async fn test_expired_token_revocation_is_noop() {
    let app = TestApp::new();
    let member = app.create_member("baek@example.com").await;
    let tokens = app.auth.login(member, SECRET).await.unwrap().tokens;

    app.advance(chrono::Duration::hours(2));
    app.auth.revoke_token(&tokens.access_token).await.unwrap();
    assert_eq!(app.cache.live_entries(), 0);
}

#[tokio::test]
async fn test_store_outage_fails_closed() {
    let app = TestApp::new();
    let member = app.create_member("nam@example.com").await;
    let tokens = app.auth.login(member, SECRET).await.unwrap().tokens;

    app.cache.set_down(true);

    let err = app
        .auth
        .validate_token(&tokens.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::StoreUnavailable(_)));
    assert!(err.is_transient());

    let err = app
        .auth
        .revoke_token(&tokens.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::StoreUnavailable(_)));

    app.cache.set_down(false);
    assert!(app.auth.validate_token(&tokens.access_token).await.is_ok());
}

#[tokio::test]
async fn test_tampered_claims_are_rejected() {
    let app = TestApp::new();
    let token = app
        .auth
        .sessions()
        .tokens()
        .issue(MemberId::new(), AuxiliaryClaims::default(), TokenType::Access)
        .unwrap();

    let segments: Vec<&str> = token.split('.').collect();
    let payload = segments[1];
    for i in 0..payload.len() {
        let mut bytes = payload.as_bytes().to_vec();
        bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
        let forged = format!(
            "{}.{}.{}",
            segments[0],
            String::from_utf8(bytes).unwrap(),
            segments[2]
        );
        let err = app.auth.validate_token(&forged).await.unwrap_err();
        assert!(
            matches!(err, AuthError::Rejected(TokenRejection::InvalidSignature)),
            "byte {i}: {err:?}"
        );
    }
}

#[tokio::test]
async fn test_foreign_key_is_rejected() {
    let app = TestApp::new();
    let other = TestApp::with_config(AuthConfig {
        jwt_secret: "some-other-deployment".into(),
        ..AuthConfig::default()
    });

    let pair = other
        .auth
        .issue_token_pair(MemberId::new(), AuxiliaryClaims::default())
        .unwrap();

    let err = app.auth.validate_token(&pair.access_token).await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::Rejected(TokenRejection::InvalidSignature)
    ));
}
