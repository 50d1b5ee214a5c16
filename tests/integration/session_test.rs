//! Integration tests for session issuance, eviction and the assembled core.

mod helpers;

use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use serde_json::json;

use helpers::{
    PROFILE, ScriptedExtension, TestApp, authn_success, authn_success_with,
    password_capabilities, principal_found,
};
use warden::{AppConfig, LoginParameters, Warden};
use warden_auth::LoginMessage;
use warden_core::config::SessionConfig;
use warden_entity::record::auth::format_valid_to;
use warden_extension::builtin::PasswordHasher;
use warden_extension::{Capabilities, InvokeCommand};
use warden_session::{SessionCleanup, SessionStore};

#[tokio::test]
async fn test_tokens_are_unique_and_full_length() {
    let app = TestApp::accepting("alice").await;

    let mut tokens = HashSet::new();
    for _ in 0..20 {
        let result = app
            .login
            .run(LoginParameters::credentials(PROFILE, "alice", "pw"))
            .await
            .unwrap();
        let token = result.session_id.unwrap();
        assert_eq!(URL_SAFE_NO_PAD.decode(&token).unwrap().len(), 64);
        assert!(tokens.insert(token));
    }
    assert_eq!(app.sessions.len().await.unwrap(), 20);
}

#[tokio::test]
async fn test_cleanup_evicts_sessions_past_valid_to() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities()).respond(
                InvokeCommand::AuthenticateCredentials,
                authn_success_with(json!({
                    "PRINCIPAL": "alice",
                    "VALID_TO": format_valid_to(Utc::now() - Duration::minutes(1)),
                })),
            ),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .build()
        .await;

    let result = app
        .login
        .run(LoginParameters::credentials(PROFILE, "alice", "pw"))
        .await
        .unwrap();
    assert!(result.succeeded);
    assert_eq!(app.sessions.len().await.unwrap(), 1);

    let cleanup = SessionCleanup::new(app.sessions.clone(), &SessionConfig::default());
    assert_eq!(cleanup.run_cleanup().await.unwrap(), 1);
    assert!(
        app.sessions
            .get_session(&result.session_id.unwrap())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_cleanup_keeps_live_sessions() {
    let app = TestApp::accepting("alice").await;
    app.login
        .run(LoginParameters::credentials(PROFILE, "alice", "pw"))
        .await
        .unwrap();

    let cleanup = SessionCleanup::new(app.sessions.clone(), &SessionConfig::default());
    assert_eq!(cleanup.run_cleanup().await.unwrap(), 0);
    assert_eq!(app.sessions.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_password_not_retained_when_disabled() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .session(SessionConfig {
            retain_password: false,
            ..SessionConfig::default()
        })
        .build()
        .await;

    let result = app
        .login
        .run(LoginParameters::credentials(PROFILE, "alice", "pw"))
        .await
        .unwrap();
    let token = result.session_id.unwrap();

    assert!(app.sessions.get_password(&token).await.unwrap().is_none());
    assert!(app.sessions.get_user(&token).await.unwrap().is_some());
}

fn internal_config(hash: &str) -> AppConfig {
    AppConfig::from_toml(&format!(
        r#"
        [session]
        hard_limit_minutes = 60

        [[profiles]]
        name = "internal"
        authn = "corp-authn"
        authz = "corp-authz"
        mapper = "corp-mapper"

        [[extensions.internal]]
        name = "corp"
        record_ttl_minutes = 30

        [[extensions.internal.users]]
        name = "admin"
        password_hash = "{hash}"
        groups = ["admins"]

        [[extensions.internal.users]]
        name = "carol"
        password_hash = "{hash}"
        password_expired = true
        change_url = "https://corp.example/password"

        [[extensions.internal.groups]]
        name = "admins"

        [[extensions.mappers]]
        name = "corp-mapper"
        strip_suffix = "@corp.example"

        [permissions]
        admin_groups = ["admins"]
        "#
    ))
    .unwrap()
}

#[tokio::test]
async fn test_assembled_core_logs_in_internal_user() {
    let hash = PasswordHasher::new().hash_password("s3cret").unwrap();
    let warden = Warden::from_config(internal_config(&hash)).await.unwrap();
    let cleanup = warden.spawn_session_cleanup();

    let result = warden
        .login()
        .run(LoginParameters::credentials(
            "internal",
            "admin@corp.example",
            "s3cret",
        ))
        .await
        .unwrap();

    assert!(result.succeeded);
    let user = result.user.unwrap();
    assert_eq!(user.login_name, "admin");
    assert_eq!(user.domain, "corp-authz");
    assert!(user.admin);
    assert!(user.group_ids.contains("admins"));

    let token = result.session_id.unwrap();
    let hard_limit = warden
        .sessions()
        .get_hard_limit(&token)
        .await
        .unwrap()
        .unwrap();
    assert!(hard_limit <= Utc::now() + Duration::minutes(30));

    let stored = warden
        .directory()
        .find_by_external_id("corp-authz", "admin")
        .await
        .unwrap();
    assert_eq!(stored.unwrap().id, user.id);

    warden.shutdown().await;
    cleanup.await.unwrap();
}

#[tokio::test]
async fn test_assembled_core_reports_failures() {
    let hash = PasswordHasher::new().hash_password("s3cret").unwrap();
    let warden = Warden::from_config(internal_config(&hash)).await.unwrap();

    let wrong = warden
        .login()
        .run(LoginParameters::credentials("internal", "admin", "guess"))
        .await
        .unwrap();
    assert!(!wrong.succeeded);
    assert!(wrong.has_message(LoginMessage::WrongUsernameOrPassword));

    let expired = warden
        .login()
        .run(LoginParameters::credentials("internal", "carol", "s3cret"))
        .await
        .unwrap();
    let message = expired
        .message(LoginMessage::PasswordExpiredWithUrl)
        .unwrap();
    assert_eq!(message.variable("URL"), Some("https://corp.example/password"));

    let unknown_profile = warden
        .login()
        .run(LoginParameters::credentials("external", "admin", "s3cret"))
        .await
        .unwrap();
    assert!(unknown_profile.has_message(LoginMessage::FailedToAuthenticate));

    assert_eq!(warden.sessions().len().await.unwrap(), 0);
    warden.shutdown().await;
}

#[tokio::test]
async fn test_unknown_extension_in_profile_is_rejected() {
    let config = AppConfig::from_toml(
        r#"
        [[profiles]]
        name = "broken"
        authn = "missing-authn"
        authz = "missing-authz"
        "#,
    )
    .unwrap();

    assert!(Warden::from_config(config).await.is_err());
}
