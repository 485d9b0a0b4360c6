//! Authentication Flow Integration Tests
//!
//! Exercises the four orchestrator flows end to end against the in-memory
//! ports: login, client-credential exchange, refresh rotation, and
//! revocation.

use std::sync::Arc;

use chrono::{Duration, Utc};

use af_platform::api::{ApiEnvelope, NoData};
use af_platform::config::{ClientRegistry, TokenOptions};
use af_platform::domain::ServiceClient;
use af_platform::error::AuthError;
use af_platform::repository::{
    InMemoryRefreshTokenStore, InMemoryUserDirectory, RefreshTokenStore, UserDirectory,
};
use af_platform::service::{AuthenticationService, PasswordService, TokenService};

const EMAIL: &str = "jsmith@example.com";
const PASSWORD: &str = "Password12*";

struct Harness {
    auth: AuthenticationService,
    store: Arc<InMemoryRefreshTokenStore>,
    directory: Arc<InMemoryUserDirectory>,
    tokens: Arc<TokenService>,
}

fn token_options() -> TokenOptions {
    TokenOptions {
        issuer: "www.authserver.com".to_string(),
        audiences: vec!["www.api1.com".to_string(), "www.api2.com".to_string()],
        security_key: "0123456789abcdef0123456789abcdef".to_string(),
        access_token_expiration_minutes: 5,
        refresh_token_expiration_minutes: 600,
        clock_skew_seconds: 0,
    }
}

fn harness() -> Harness {
    let directory = Arc::new(InMemoryUserDirectory::new(Arc::new(PasswordService::new())));
    let store = Arc::new(InMemoryRefreshTokenStore::new());
    let registry = Arc::new(ClientRegistry::new(vec![
        ServiceClient::new("app1", "secret1", ["www.api1.com"]),
        ServiceClient::new("app2", "secret2", ["www.api1.com", "www.api2.com"]),
        ServiceClient::new("partner", "secret3", ["www.partner.com"]),
    ]));
    let tokens = Arc::new(
        TokenService::new(token_options())
            .unwrap()
            .with_accepted_audiences(registry.audiences()),
    );

    let auth = AuthenticationService::new(
        directory.clone(),
        tokens.clone(),
        store.clone(),
        registry,
    );

    Harness {
        auth,
        store,
        directory,
        tokens,
    }
}

async fn seed_user(harness: &Harness) -> String {
    let user = harness
        .directory
        .create_user(af_platform::domain::NewUser {
            user_name: "jsmith".to_string(),
            email: EMAIL.to_string(),
            password: PASSWORD.to_string(),
            city: Some("Ankara".to_string()),
            birth_date: None,
        })
        .await
        .unwrap();
    harness
        .directory
        .assign_roles("jsmith", &["admin".to_string(), "manager".to_string()])
        .await
        .unwrap();
    user.id
}

mod login_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_issues_pair_with_correct_claims() {
        let h = harness();
        let user_id = seed_user(&h).await;

        let pair = h.auth.login(EMAIL, PASSWORD).await.unwrap();
        let claims = h.tokens.decode(&pair.access_token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email.as_deref(), Some(EMAIL));
        assert_eq!(claims.preferred_username.as_deref(), Some("jsmith"));
        assert_eq!(claims.roles, vec!["admin", "manager"]);
        assert_eq!(claims.city.as_deref(), Some("Ankara"));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let h = harness();
        seed_user(&h).await;

        let wrong_password = h.auth.login(EMAIL, "WrongPassword1*").await.unwrap_err();
        let unknown_email = h
            .auth
            .login("nobody@example.com", PASSWORD)
            .await
            .unwrap_err();

        // Same envelope, byte for byte.
        let e1: ApiEnvelope<NoData> = ApiEnvelope::from_error(&wrong_password);
        let e2: ApiEnvelope<NoData> = ApiEnvelope::from_error(&unknown_email);
        assert_eq!(
            serde_json::to_string(&e1).unwrap(),
            serde_json::to_string(&e2).unwrap()
        );
        assert_eq!(e1.status_code, 400);
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected() {
        let h = harness();
        let err = h.auth.login("", "").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_repeated_logins_keep_one_record_per_user() {
        let h = harness();
        let user_id = seed_user(&h).await;

        let mut last_refresh = String::new();
        for _ in 0..5 {
            last_refresh = h.auth.login(EMAIL, PASSWORD).await.unwrap().refresh_token;
        }

        assert_eq!(h.store.record_count(), 1);
        let record = h.store.find_by_user_id(&user_id).await.unwrap().unwrap();
        assert_eq!(record.code, last_refresh);
    }
}

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_valid_client_gets_token_with_its_audiences() {
        let h = harness();

        let token = h.auth.client_credentials("app1", "secret1").await.unwrap();
        let claims = h.tokens.decode(&token.access_token).unwrap();

        assert_eq!(claims.sub, "app1");
        assert_eq!(claims.aud, vec!["www.api1.com"]);
        assert!(claims.roles.is_empty());
    }

    #[tokio::test]
    async fn test_client_token_verifies_with_audience_outside_user_set() {
        let h = harness();

        // "www.partner.com" is not among the configured user audiences.
        let token = h.auth.client_credentials("partner", "secret3").await.unwrap();
        let claims = h.tokens.decode(&token.access_token).unwrap();

        assert_eq!(claims.sub, "partner");
        assert_eq!(claims.aud, vec!["www.partner.com"]);
    }

    #[tokio::test]
    async fn test_unknown_client_is_404_and_nothing_persisted() {
        let h = harness();

        let err = h.auth.client_credentials("app1", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::ClientNotFound));
        assert_eq!(err.status_code(), 404);

        // Mixed id/secret from different records also fails.
        let err = h.auth.client_credentials("app1", "secret2").await.unwrap_err();
        assert!(matches!(err, AuthError::ClientNotFound));

        assert_eq!(h.store.record_count(), 0);
    }
}

mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_rotates_the_token() {
        let h = harness();
        seed_user(&h).await;

        let original = h.auth.login(EMAIL, PASSWORD).await.unwrap().refresh_token;

        let second = h.auth.refresh(&original).await.unwrap().refresh_token;
        assert_ne!(original, second);

        let third = h.auth.refresh(&second).await.unwrap().refresh_token;
        assert_ne!(second, third);

        // The original value was invalidated by the first rotation.
        let err = h.auth.refresh(&original).await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenNotFound));
        assert_eq!(err.status_code(), 404);

        // Still exactly one record.
        assert_eq!(h.store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_refresh_token_is_404() {
        let h = harness();
        let err = h.auth.refresh("never-issued").await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenNotFound));
    }

    #[tokio::test]
    async fn test_expired_refresh_token_rejected_and_not_rotated() {
        let h = harness();
        let user_id = seed_user(&h).await;

        let expired_at = Utc::now() - Duration::minutes(1);
        h.store
            .upsert(&user_id, "stale-code", expired_at)
            .await
            .unwrap();
        h.store.commit().await.unwrap();

        let err = h.auth.refresh("stale-code").await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenExpired));
        assert_eq!(err.status_code(), 401);

        // Record untouched: the expired value was not rotated away.
        let record = h.store.find_by_token("stale-code").await.unwrap().unwrap();
        assert_eq!(record.user_id, user_id);
    }

    #[tokio::test]
    async fn test_dangling_refresh_token_is_404() {
        let h = harness();
        // Record exists, but no such user in the directory.
        h.store
            .upsert("ghost-user", "orphan-code", Utc::now() + Duration::minutes(600))
            .await
            .unwrap();
        h.store.commit().await.unwrap();

        let err = h.auth.refresh("orphan-code").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_refresh_pair_carries_user_claims() {
        let h = harness();
        let user_id = seed_user(&h).await;

        let refresh = h.auth.login(EMAIL, PASSWORD).await.unwrap().refresh_token;
        let pair = h.auth.refresh(&refresh).await.unwrap();
        let claims = h.tokens.decode(&pair.access_token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email.as_deref(), Some(EMAIL));
    }
}

mod revoke_tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_is_destructive() {
        let h = harness();
        seed_user(&h).await;

        let refresh = h.auth.login(EMAIL, PASSWORD).await.unwrap().refresh_token;
        h.auth.revoke(&refresh).await.unwrap();

        let err = h.auth.refresh(&refresh).await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenNotFound));
        assert_eq!(h.store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_is_404() {
        let h = harness();
        let err = h.auth.revoke("never-issued").await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenNotFound));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_login_after_revoke_starts_a_new_chain() {
        let h = harness();
        seed_user(&h).await;

        let first = h.auth.login(EMAIL, PASSWORD).await.unwrap().refresh_token;
        h.auth.revoke(&first).await.unwrap();

        let second = h.auth.login(EMAIL, PASSWORD).await.unwrap().refresh_token;
        assert_ne!(first, second);
        assert!(h.auth.refresh(&second).await.is_ok());
    }
}
