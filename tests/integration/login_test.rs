//! Integration tests for the login flow.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use helpers::{
    PROFILE, ScriptedExtension, TestApp, authn_failure, authn_success, authn_success_with,
    password_capabilities, principal_found,
};
use warden_auth::{
    AuthFailureReason, AuthType, LoginFailure, LoginMessage, LoginParameters, LoginStage,
};
use warden_core::config::{PermissionConfig, SessionConfig};
use warden_core::error::ErrorKind;
use warden_core::{AppError, AppResult};
use warden_database::UserDirectory;
use warden_entity::record::auth::{format_valid_to, parse_valid_to};
use warden_entity::{AuditLogType, AuthRecord, ExtMap, LocalUser, ReportReason};
use warden_extension::protocol::keys;
use warden_extension::{Capabilities, InvokeCommand};
use warden_session::{SessionStore, TokenGenerator};

fn credentials(user: &str, password: &str) -> LoginParameters {
    LoginParameters::credentials(PROFILE, user, password)
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::accepting("alice").await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(result.succeeded);
    assert!(result.failure.is_none());
    assert!(result.messages.is_empty());
    let user = result.user.unwrap();
    assert_eq!(user.login_name, "alice");
    assert_eq!(user.external_id, "uid-alice");
    assert_eq!(user.domain, "test-authz");

    let token = result.session_id.unwrap();
    let session = app.sessions.get_session(&token).await.unwrap().unwrap();
    assert_eq!(session.profile_name.as_deref(), Some(PROFILE));
    assert_eq!(session.user.unwrap().id, user.id);
    assert_eq!(session.auth_record.unwrap().principal(), Some("alice"));
    assert_eq!(session.principal_record.unwrap().name(), Some("alice"));
    assert_eq!(session.password.unwrap().expose(), "pw");

    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_type, AuditLogType::UserLogin);
    assert_eq!(entries[0].user_name, "alice@test");

    let reports = app.accounting.reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].reason, ReportReason::CredentialsLogin);
    assert_eq!(reports[0].authz_name, "test-authz");
    assert_eq!(
        reports[0].message,
        "User alice which has principal name alice logged in"
    );

    assert_eq!(
        app.authn.commands(),
        vec![InvokeCommand::AuthenticateCredentials]
    );
    let call = &app.authn.calls()[0];
    assert_eq!(call.get_str(keys::USER), Some("alice"));
    assert_eq!(call.get_str(keys::CREDENTIALS), Some("pw"));
}

#[tokio::test]
async fn test_profile_not_found() {
    let app = TestApp::accepting("alice").await;

    let result = app
        .login
        .run(LoginParameters::credentials("missing", "alice", "pw"))
        .await
        .unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.failure, Some(LoginFailure::ProfileNotFound));
    assert!(result.has_message(LoginMessage::FailedToAuthenticate));
    assert!(app.authn.calls().is_empty());
    assert!(app.authz.calls().is_empty());

    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_type, AuditLogType::UserLoginFailed);
    assert_eq!(entries[0].user_name, "alice@missing");
}

#[tokio::test]
async fn test_missing_profile_name_displays_na() {
    let app = TestApp::accepting("alice").await;

    let result = app
        .login
        .run(LoginParameters {
            login_name: Some("alice".into()),
            password: Some("pw".into()),
            ..LoginParameters::default()
        })
        .await
        .unwrap();

    assert_eq!(result.failure, Some(LoginFailure::ProfileNotFound));
    assert_eq!(app.audit.entries().await[0].user_name, "alice@N/A");
}

#[tokio::test]
async fn test_valid_to_earlier_than_hard_limit() {
    let valid_to = parse_valid_to(&format_valid_to(Utc::now() + Duration::hours(1))).unwrap();
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities()).respond(
                InvokeCommand::AuthenticateCredentials,
                authn_success_with(json!({
                    "PRINCIPAL": "alice",
                    "VALID_TO": format_valid_to(valid_to),
                })),
            ),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .session(SessionConfig {
            hard_limit_minutes: 600,
            ..SessionConfig::default()
        })
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();
    let token = result.session_id.unwrap();

    assert_eq!(
        app.sessions.get_hard_limit(&token).await.unwrap(),
        Some(valid_to)
    );
}

#[tokio::test]
async fn test_hard_limit_earlier_than_valid_to() {
    let before = Utc::now();
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities()).respond(
                InvokeCommand::AuthenticateCredentials,
                authn_success_with(json!({
                    "PRINCIPAL": "alice",
                    "VALID_TO": format_valid_to(before + Duration::days(2)),
                })),
            ),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .session(SessionConfig {
            hard_limit_minutes: 30,
            ..SessionConfig::default()
        })
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();
    let after = Utc::now();
    let limit = app
        .sessions
        .get_hard_limit(&result.session_id.unwrap())
        .await
        .unwrap()
        .unwrap();

    assert!(limit >= before + Duration::minutes(30));
    assert!(limit <= after + Duration::minutes(30));
}

#[tokio::test]
async fn test_unlimited_session_without_valid_to() {
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
            hard_limit_minutes: 0,
            ..SessionConfig::default()
        })
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();
    let token = result.session_id.unwrap();
    assert!(app.sessions.get_hard_limit(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_credentials_with_change_url() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities()).respond(
                InvokeCommand::AuthenticateCredentials,
                authn_failure(8)
                    .with(keys::PRINCIPAL, "alice")
                    .with(keys::CREDENTIALS_CHANGE_URL, "  https://pw.example/change  "),
            ),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(
        result.failure,
        Some(LoginFailure::CredentialsExpired {
            change_url: Some("https://pw.example/change".into()),
            user_message: None,
        })
    );
    let message = result.message(LoginMessage::PasswordExpiredWithUrl).unwrap();
    assert_eq!(message.variable("URL"), Some("https://pw.example/change"));
    assert!(!result.has_message(LoginMessage::PasswordExpired));
    assert!(app.authz.calls().is_empty());

    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].log_type, AuditLogType::UserAccountPasswordExpired);
    assert_eq!(entries[0].user_name, "alice");
    assert_eq!(entries[1].log_type, AuditLogType::UserLoginFailed);
    assert_eq!(entries[1].user_name, "alice@test");
}

#[tokio::test]
async fn test_expired_credentials_with_url_and_message() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities()).respond(
                InvokeCommand::AuthenticateCredentials,
                authn_failure(8)
                    .with(keys::CREDENTIALS_CHANGE_URL, "https://pw.example")
                    .with(keys::USER_MESSAGE, "Contact the help desk"),
            ),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(result.has_message(LoginMessage::PasswordExpiredWithUrl));
    let message = result
        .message(LoginMessage::PasswordExpiredWithMessage)
        .unwrap();
    assert_eq!(message.variable("MSG"), Some("Contact the help desk"));
}

#[tokio::test]
async fn test_principal_not_found() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.failure, Some(LoginFailure::PrincipalNotFound));
    assert!(result.has_message(LoginMessage::UserMustExistInDirectory));
    assert!(app.directory.is_empty());
    assert_eq!(app.sessions.len().await.unwrap(), 0);

    let reports = app.accounting.reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].reason, ReportReason::PrincipalNotFound);
    assert_eq!(reports[0].login_name.as_deref(), Some("alice"));
    assert_eq!(reports[0].auth_record.principal(), Some("alice"));
    assert!(reports[0].principal_record.is_none());
    assert_eq!(
        reports[0].message,
        "Principal record was not found. User name is alice"
    );

    let failed = app.audit.entries_of(AuditLogType::UserLoginFailed).await;
    assert_eq!(failed.len(), 1);
}

#[tokio::test]
async fn test_authorization_denied() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty()).respond(
                InvokeCommand::FetchPrincipalRecord,
                principal_found("alice", &["guests"]),
            ),
        )
        .permissions(PermissionConfig {
            login_groups: vec!["gid-staff".into()],
            ..PermissionConfig::default()
        })
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.failure, Some(LoginFailure::AuthorizationDenied));
    assert!(result.has_message(LoginMessage::NotAuthorizedToPerformAction));
    assert_eq!(app.sessions.len().await.unwrap(), 0);
    // Directory sync precedes the permission check.
    assert_eq!(app.directory.len(), 1);

    let reports = app.accounting.reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].reason, ReportReason::LoginNoPermission);
    assert!(reports[0].principal_record.is_some());
    assert_eq!(
        reports[0].message,
        "The user alice is not authorized to perform login"
    );
}

#[tokio::test]
async fn test_login_granted_through_group() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty()).respond(
                InvokeCommand::FetchPrincipalRecord,
                principal_found("alice", &["staff"]),
            ),
        )
        .permissions(PermissionConfig {
            login_groups: vec!["gid-staff".into()],
            ..PermissionConfig::default()
        })
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();
    assert!(result.succeeded);
    assert!(result.user.unwrap().group_ids.contains("gid-staff"));
}

#[tokio::test]
async fn test_login_granted_through_nested_group() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty()).respond(
                InvokeCommand::FetchPrincipalRecord,
                ExtMap::new().with(keys::RESULT, 0).with(
                    keys::PRINCIPAL_RECORD,
                    json!({
                        "ID": "uid-alice",
                        "NAME": "alice",
                        "GROUPS": [
                            {"ID": "devs", "GROUPS": [
                                {"ID": "staff", "GROUPS": [{"ID": "vpn-users"}]}
                            ]},
                            {"ID": "ops", "GROUPS": [{"ID": "staff"}]}
                        ],
                    }),
                ),
            ),
        )
        .permissions(PermissionConfig {
            login_groups: vec!["vpn-users".into()],
            ..PermissionConfig::default()
        })
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(result.succeeded);
    assert!(result.user.unwrap().group_ids.contains("vpn-users"));
}

#[tokio::test]
async fn test_missing_password_is_silent() {
    let app = TestApp::accepting("alice").await;

    let result = app
        .login
        .run(LoginParameters {
            login_name: Some("alice".into()),
            profile_name: Some(PROFILE.into()),
            ..LoginParameters::default()
        })
        .await
        .unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.failure, Some(LoginFailure::MissingPassword));
    assert!(result.messages.is_empty());
    assert!(app.authn.calls().is_empty());

    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_type, AuditLogType::UserLoginFailed);
}

#[tokio::test]
async fn test_empty_login_name_fails_before_any_invocation() {
    let app = TestApp::accepting("alice").await;

    let result = app.login.run(credentials("", "pw")).await.unwrap();

    assert_eq!(result.failure, Some(LoginFailure::MissingLoginName));
    assert!(result.has_message(LoginMessage::FailedToAuthenticate));
    assert!(app.authn.calls().is_empty());
    assert!(app.authz.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_auth_method() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new(
                "test-authn",
                Capabilities::AUTHENTICATE_NEGOTIATE_NON_INTERACTIVE,
            )
            .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert_eq!(result.failure, Some(LoginFailure::UnsupportedAuthMethod));
    assert!(result.has_message(LoginMessage::FailedToAuthenticate));
    assert!(app.authn.calls().is_empty());
}

#[tokio::test]
async fn test_wrong_password() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_failure(3)),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "nope")).await.unwrap();

    assert_eq!(
        result.failure,
        Some(LoginFailure::AuthenticationFailed {
            reason: AuthFailureReason::InvalidCredentials
        })
    );
    assert!(result.has_message(LoginMessage::WrongUsernameOrPassword));

    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0].log_type,
        AuditLogType::AuthFailedInvalidCredentials
    );
    assert_eq!(entries[1].log_type, AuditLogType::UserLoginFailed);
}

#[tokio::test]
async fn test_general_error_logs_single_failed_entry() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_failure(1)),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(result.has_message(LoginMessage::FailedToAuthenticate));
    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_type, AuditLogType::UserLoginFailed);
}

#[tokio::test]
async fn test_unknown_result_code_is_generic() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_failure(42)),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert_eq!(
        result.failure,
        Some(LoginFailure::AuthenticationFailed {
            reason: AuthFailureReason::Unknown(42)
        })
    );
    assert_eq!(result.messages.len(), 1);
    assert!(result.has_message(LoginMessage::FailedToAuthenticate));
    assert_eq!(app.audit.entries().await.len(), 1);
}

#[tokio::test]
async fn test_locked_account_uses_reported_principal() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities()).respond(
                InvokeCommand::AuthenticateCredentials,
                authn_failure(4).with(keys::PRINCIPAL, "alice@corp"),
            ),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(result.has_message(LoginMessage::AccountDisabled));
    let entries = app.audit.entries().await;
    assert_eq!(
        entries[0].log_type,
        AuditLogType::UserAccountDisabledOrLocked
    );
    assert_eq!(entries[1].user_name, "alice@corp@test");
}

#[tokio::test]
async fn test_mapper_translates_user_and_auth_record() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .mapper(
            ScriptedExtension::new("test-mapper", Capabilities::empty())
                .respond(
                    InvokeCommand::MapUser,
                    ExtMap::new().with(keys::RESULT, 0).with(keys::USER, "alice"),
                )
                .respond(
                    InvokeCommand::MapAuthRecord,
                    authn_success_with(json!({ "PRINCIPAL": "alice", "MAPPED": true })),
                ),
        )
        .build()
        .await;

    let result = app
        .login
        .run(credentials("ALICE@corp.example", "pw"))
        .await
        .unwrap();

    assert!(result.succeeded);
    assert_eq!(app.authn.calls()[0].get_str(keys::USER), Some("alice"));
    assert_eq!(
        app.mapper.as_ref().unwrap().commands(),
        vec![InvokeCommand::MapUser, InvokeCommand::MapAuthRecord]
    );

    let session = app
        .sessions
        .get_session(&result.session_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(
        session
            .auth_record
            .unwrap()
            .as_map()
            .contains_key("MAPPED")
    );
}

#[tokio::test]
async fn test_mapper_without_output_is_identity() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .mapper(ScriptedExtension::new("test-mapper", Capabilities::empty()))
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(app.authn.calls()[0].get_str(keys::USER), Some("alice"));
    let auth_record = app
        .sessions
        .get_session(&result.session_id.unwrap())
        .await
        .unwrap()
        .unwrap()
        .auth_record
        .unwrap();
    assert_eq!(auth_record, AuthRecord::new("alice"));
}

#[tokio::test]
async fn test_map_user_skipped_without_credentials_capability() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", Capabilities::AUTHENTICATE_PASSWORD)
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .mapper(ScriptedExtension::new("test-mapper", Capabilities::empty()))
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(
        app.mapper.as_ref().unwrap().commands(),
        vec![InvokeCommand::MapAuthRecord]
    );
}

#[tokio::test]
async fn test_negotiated_auth_record_skips_authentication() {
    let app = TestApp::accepting("alice").await;

    let result = app
        .login
        .run(LoginParameters::with_auth_record(
            PROFILE,
            AuthRecord::new("alice"),
            AuthType::Negotiation,
        ))
        .await
        .unwrap();

    assert!(result.succeeded);
    assert!(app.authn.calls().is_empty());
    assert_eq!(
        app.authz.commands(),
        vec![InvokeCommand::FetchPrincipalRecord]
    );

    let reports = app.accounting.reports().await;
    assert_eq!(reports[0].reason, ReportReason::NegotiateLogin);

    let session = app
        .sessions
        .get_session(&result.session_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(session.password.is_none());
    assert_eq!(app.audit.entries().await[0].user_name, "alice@test");
}

#[tokio::test]
async fn test_session_credentials_are_reused() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("bob")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("bob", &[])),
        )
        .build()
        .await;

    app.sessions
        .set_user("existing", LocalUser::new("uid-bob", "bob", "test-authz"))
        .await
        .unwrap();
    app.sessions
        .set_password("existing", "bob-secret".into())
        .await
        .unwrap();

    let result = app
        .login
        .run(credentials("alice", "pw").session_id("existing"))
        .await
        .unwrap();

    assert!(result.succeeded);
    let call = &app.authn.calls()[0];
    assert_eq!(call.get_str(keys::USER), Some("bob"));
    assert_eq!(call.get_str(keys::CREDENTIALS), Some("bob-secret"));
}

#[tokio::test]
async fn test_session_without_password_is_not_reused() {
    let app = TestApp::accepting("alice").await;
    app.sessions
        .set_user("pending", LocalUser::new("uid-bob", "bob", "test-authz"))
        .await
        .unwrap();

    let result = app
        .login
        .run(credentials("alice", "pw").pending_session_id("pending"))
        .await
        .unwrap();

    assert!(result.succeeded);
    assert_eq!(app.authn.calls()[0].get_str(keys::USER), Some("alice"));
}

#[tokio::test]
async fn test_collaborator_failure_is_unavailable() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, authn_failure(9)),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert_eq!(
        result.failure,
        Some(LoginFailure::Unavailable {
            stage: LoginStage::PrincipalResolved
        })
    );
    assert!(result.has_message(LoginMessage::FailedToAuthenticate));
    assert_eq!(app.audit.entries().await.len(), 1);
    assert!(app.accounting.reports().await.is_empty());
}

#[tokio::test]
async fn test_malformed_authenticator_response_is_unavailable() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_failure(0)),
        )
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert_eq!(
        result.failure,
        Some(LoginFailure::Unavailable {
            stage: LoginStage::Authenticated
        })
    );
}

#[derive(Debug)]
struct NoEntropy;

impl TokenGenerator for NoEntropy {
    fn generate(&self) -> AppResult<String> {
        Err(AppError::random_source("entropy pool unavailable"))
    }
}

#[tokio::test]
async fn test_random_source_failure_is_fatal() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .tokens(Arc::new(NoEntropy))
        .build()
        .await;

    let err = app.login.run(credentials("alice", "pw")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::RandomSource);
    assert_eq!(app.sessions.len().await.unwrap(), 0);
    assert!(app.audit.entries().await.is_empty());
}

#[tokio::test]
async fn test_admin_flag_recorded_in_background() {
    let app = TestApp::builder()
        .authn(
            ScriptedExtension::new("test-authn", password_capabilities())
                .respond(InvokeCommand::AuthenticateCredentials, authn_success("alice")),
        )
        .authz(
            ScriptedExtension::new("test-authz", Capabilities::empty())
                .respond(InvokeCommand::FetchPrincipalRecord, principal_found("alice", &[])),
        )
        .permissions(PermissionConfig {
            admin_users: vec!["alice".into()],
            ..PermissionConfig::default()
        })
        .build()
        .await;

    let result = app.login.run(credentials("alice", "pw")).await.unwrap();
    assert!(result.succeeded);
    assert!(result.user.unwrap().admin);

    assert!(app.wait_for_admin_check("uid-alice").await);
    let stored = app
        .directory
        .find_by_external_id("test-authz", "uid-alice")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.admin);
}

#[tokio::test]
async fn test_repeated_login_keeps_local_user() {
    let app = TestApp::accepting("alice").await;

    let first = app.login.run(credentials("alice", "pw")).await.unwrap();
    let second = app.login.run(credentials("alice", "pw")).await.unwrap();

    assert_eq!(first.user.unwrap().id, second.user.unwrap().id);
    assert_ne!(first.session_id, second.session_id);
    assert_eq!(app.directory.len(), 1);
    assert_eq!(app.sessions.len().await.unwrap(), 2);
}
