//! The login command.
//!
//! [`LoginCommand::run`] drives one attempt through
//! `Start → ProfileResolved → {CredentialsSubmitted | AuthRecordSupplied} →
//! Authenticated → Mapped → PrincipalResolved → DirectorySynced → Authorized
//! → SessionIssued`. Any step may end the attempt instead. Every attempt that
//! ends produces exactly one terminal audit entry, and only the fatal
//! random-source error is returned as `Err`.

pub mod messages;
pub mod outcome;
pub mod parameters;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use warden_core::config::SessionConfig;
use warden_core::{AppError, AppResult};
use warden_database::UserDirectory;
use warden_entity::{AuditLogType, AuthRecord, LocalUser, ReportReason};
use warden_extension::{AuthenticationProfile, ProfileRepository};
use warden_session::{SessionStore, TokenGenerator};
use warden_worker::{BackgroundExecutor, RecordAdminCheck};

use crate::audit::{AccountingDispatcher, AuditLogDirector};
use crate::authn;
use crate::gate::{PermissionChecker, PermissionQuery};
use crate::issuer::{SessionGrant, SessionIssuer};
use crate::principal::{map_principal_record_to_user, resolve_principal};

pub use messages::{LoginMessage, UserMessage};
pub use outcome::{AuthFailureReason, LoginFailure, LoginReturnValue, LoginStage};
pub use parameters::{AuthType, LoginParameters};

/// Collaborators of a [`LoginCommand`].
#[derive(Debug, Clone)]
pub struct LoginDependencies {
    pub profiles: Arc<ProfileRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub tokens: Arc<dyn TokenGenerator>,
    pub directory: Arc<dyn UserDirectory>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub audit: Arc<dyn AuditLogDirector>,
    pub accounting: AccountingDispatcher,
    /// Executor for post-login bookkeeping. Without one the bookkeeping is skipped.
    pub background: Option<BackgroundExecutor>,
    pub session: SessionConfig,
}

/// Authenticates a user against a profile and issues a session.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    profiles: Arc<ProfileRepository>,
    directory: Arc<dyn UserDirectory>,
    permissions: Arc<dyn PermissionChecker>,
    audit: Arc<dyn AuditLogDirector>,
    accounting: AccountingDispatcher,
    background: Option<BackgroundExecutor>,
    issuer: SessionIssuer,
}

/// Why an attempt stopped early.
#[derive(Debug)]
enum Halt {
    Failed(LoginFailure),
    Fatal(AppError),
}

/// Per-attempt state.
#[derive(Debug)]
struct Attempt {
    display_name: String,
    stage: LoginStage,
    messages: Vec<UserMessage>,
}

impl Attempt {
    fn new(params: &LoginParameters) -> Self {
        Self {
            display_name: params.display_name(),
            stage: LoginStage::Start,
            messages: Vec::new(),
        }
    }

    fn advance(&mut self, stage: LoginStage) {
        debug!(user = %self.display_name, stage = %stage, "Login stage reached");
        self.stage = stage;
    }

    fn identify(&mut self, principal: &str, profile_name: &str) {
        self.display_name = parameters::display_name(principal, Some(profile_name));
    }

    fn fail(&mut self, failure: LoginFailure, messages: Vec<UserMessage>) -> Halt {
        self.messages.extend(messages);
        Halt::Failed(failure)
    }
}

/// Folds a collaborator error into the attempt outcome.
trait AtStage<T> {
    fn at(self, stage: LoginStage) -> Result<T, Halt>;
}

impl<T> AtStage<T> for AppResult<T> {
    fn at(self, stage: LoginStage) -> Result<T, Halt> {
        self.map_err(|e| {
            if e.is_fatal() {
                Halt::Fatal(e)
            } else {
                error!(stage = %stage, error = %e, "Login collaborator failed");
                Halt::Failed(LoginFailure::Unavailable { stage })
            }
        })
    }
}

/// A login that made it through every step.
struct Granted {
    session_id: String,
    user: LocalUser,
}

impl LoginCommand {
    /// Creates the command.
    pub fn new(deps: LoginDependencies) -> Self {
        let issuer = SessionIssuer::new(deps.sessions, deps.tokens, &deps.session);
        Self {
            profiles: deps.profiles,
            directory: deps.directory,
            permissions: deps.permissions,
            audit: deps.audit,
            accounting: deps.accounting,
            background: deps.background,
            issuer,
        }
    }

    /// Store sessions are issued into.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.issuer.store()
    }

    /// Profiles logins resolve against.
    pub fn profiles(&self) -> &Arc<ProfileRepository> {
        &self.profiles
    }

    /// Runs one login attempt.
    ///
    /// Expected failures are reported through the returned value. `Err` is
    /// only returned when no secure random source is available.
    pub async fn run(&self, params: LoginParameters) -> AppResult<LoginReturnValue> {
        let mut attempt = Attempt::new(&params);

        match self.execute(&params, &mut attempt).await {
            Ok(granted) => {
                info!(user = %attempt.display_name, user_id = %granted.user.id, "User logged in");
                self.audit
                    .log(&attempt.display_name, AuditLogType::UserLogin)
                    .await;
                self.submit_bookkeeping(&granted.user);
                Ok(LoginReturnValue::success(granted.session_id, granted.user))
            }
            Err(Halt::Failed(failure)) => {
                if matches!(failure, LoginFailure::Unavailable { .. }) {
                    attempt
                        .messages
                        .push(UserMessage::new(LoginMessage::FailedToAuthenticate));
                }
                info!(
                    user = %attempt.display_name,
                    stage = %attempt.stage,
                    failure = %failure,
                    "Login failed"
                );
                self.audit
                    .log(&attempt.display_name, AuditLogType::UserLoginFailed)
                    .await;
                Ok(LoginReturnValue::failure(failure, attempt.messages))
            }
            Err(Halt::Fatal(e)) => {
                error!(user = %attempt.display_name, error = %e, "Login aborted");
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        params: &LoginParameters,
        attempt: &mut Attempt,
    ) -> Result<Granted, Halt> {
        let Some(profile) = self.profiles.get_profile(params.profile_name.as_deref()) else {
            warn!(profile = ?params.profile_name, "Authentication profile not found");
            return Err(attempt.fail(
                LoginFailure::ProfileNotFound,
                vec![UserMessage::new(LoginMessage::FailedToAuthenticate)],
            ));
        };
        attempt.advance(LoginStage::ProfileResolved);

        let (auth_record, login_name, reason) = match &params.auth_record {
            Some(record) => {
                attempt.advance(LoginStage::AuthRecordSupplied);
                let reason = match params.auth_type {
                    Some(AuthType::Negotiation) => ReportReason::NegotiateLogin,
                    _ => ReportReason::CredentialsLogin,
                };
                (record.clone(), None, reason)
            }
            None => {
                let (record, login_name) =
                    self.authenticate_credentials(&profile, params, attempt).await?;
                (record, Some(login_name), ReportReason::CredentialsLogin)
            }
        };
        attempt.advance(LoginStage::Authenticated);
        if let Some(principal) = auth_record.principal() {
            attempt.identify(principal, &profile.name);
        }

        let auth_record = authn::map_auth_record(&profile, auth_record)
            .await
            .at(LoginStage::Mapped)?;
        attempt.advance(LoginStage::Mapped);

        let authz_name = profile.authz_name().to_string();
        let principal = resolve_principal(&profile, &auth_record)
            .await
            .at(LoginStage::PrincipalResolved)?;
        let Some(principal) = principal else {
            info!(
                user = %attempt.display_name,
                authz = %authz_name,
                "Principal record not found"
            );
            self.accounting
                .report(
                    ReportReason::PrincipalNotFound,
                    &authz_name,
                    login_name.as_deref(),
                    &auth_record,
                    None,
                    format!(
                        "Principal record was not found. User name is {}",
                        login_name.as_deref().unwrap_or_default()
                    ),
                )
                .await;
            return Err(attempt.fail(
                LoginFailure::PrincipalNotFound,
                vec![UserMessage::new(LoginMessage::UserMustExistInDirectory)],
            ));
        };
        attempt.advance(LoginStage::PrincipalResolved);

        let user =
            map_principal_record_to_user(&authz_name, &principal).at(LoginStage::DirectorySynced)?;
        let mut user = self
            .directory
            .save_or_update(&user)
            .await
            .at(LoginStage::DirectorySynced)?;
        attempt.advance(LoginStage::DirectorySynced);

        let permitted = self
            .permissions
            .check_user_and_groups_authorization(&PermissionQuery::login(&user))
            .await
            .at(LoginStage::Authorized)?;
        if !permitted {
            info!(
                user = %attempt.display_name,
                user_id = %user.id,
                "User is not permitted to log in"
            );
            self.accounting
                .report(
                    ReportReason::LoginNoPermission,
                    &authz_name,
                    Some(&user.login_name),
                    &auth_record,
                    Some(&principal),
                    format!(
                        "The user {} is not authorized to perform login",
                        user.login_name
                    ),
                )
                .await;
            return Err(attempt.fail(
                LoginFailure::AuthorizationDenied,
                vec![UserMessage::new(LoginMessage::NotAuthorizedToPerformAction)],
            ));
        }

        user.admin = self
            .permissions
            .is_admin_user(&user)
            .await
            .at(LoginStage::Authorized)?;
        debug!(user_id = %user.id, admin = user.admin, "Admin flag evaluated");
        attempt.advance(LoginStage::Authorized);

        self.accounting
            .report(
                reason,
                &authz_name,
                Some(&user.login_name),
                &auth_record,
                Some(&principal),
                format!(
                    "User {} which has principal name {} logged in",
                    user.login_name,
                    principal.name().unwrap_or_default()
                ),
            )
            .await;

        let session_id = self
            .issuer
            .issue(SessionGrant {
                profile_name: profile.name.clone(),
                user: user.clone(),
                auth_record,
                principal_record: principal,
                password: params.password.clone().filter(|p| !p.is_empty()),
            })
            .await
            .at(LoginStage::SessionIssued)?;
        attempt.advance(LoginStage::SessionIssued);

        Ok(Granted { session_id, user })
    }

    /// Credentials path: validates the submission, reuses remembered session
    /// credentials and runs the authenticator.
    async fn authenticate_credentials(
        &self,
        profile: &AuthenticationProfile,
        params: &LoginParameters,
        attempt: &mut Attempt,
    ) -> Result<(AuthRecord, String), Halt> {
        attempt.advance(LoginStage::CredentialsSubmitted);

        let Some(mut login_name) = params.login_name.clone().filter(|name| !name.is_empty())
        else {
            return Err(attempt.fail(
                LoginFailure::MissingLoginName,
                vec![UserMessage::new(LoginMessage::FailedToAuthenticate)],
            ));
        };
        let Some(mut password) = params.password.clone().filter(|p| !p.is_empty()) else {
            return Err(attempt.fail(LoginFailure::MissingPassword, Vec::new()));
        };

        if !profile.authn.capabilities().supports_password() {
            warn!(
                profile = %profile.name,
                authn = %profile.authn.name(),
                "Authenticator does not support password authentication"
            );
            return Err(attempt.fail(
                LoginFailure::UnsupportedAuthMethod,
                vec![UserMessage::new(LoginMessage::FailedToAuthenticate)],
            ));
        }

        if let Some(token) = params.credential_session() {
            let sessions = self.sessions();
            let user = sessions
                .get_user(token)
                .await
                .at(LoginStage::CredentialsSubmitted)?;
            let remembered = sessions
                .get_password(token)
                .await
                .at(LoginStage::CredentialsSubmitted)?;
            if let (Some(user), Some(remembered)) = (user, remembered) {
                if !remembered.is_empty() {
                    debug!(
                        user = %user.login_name,
                        "Reusing credentials remembered by the session"
                    );
                    login_name = user.login_name;
                    password = remembered;
                }
            }
        }

        let authentication = authn::authenticate(profile, login_name.clone(), password)
            .await
            .at(LoginStage::Authenticated)?;
        let response = authentication.response;
        if let Some(principal) = &response.principal {
            attempt.identify(principal, &profile.name);
        }

        if !response.result.is_success() {
            info!(
                profile = %profile.name,
                user = %authentication.mapped_user,
                result = %response.result,
                "Authentication failed"
            );
            if let Some(log_type) = messages::audit_log_type_for(response.result) {
                if log_type != AuditLogType::UserLoginFailed {
                    self.audit.log(&authentication.mapped_user, log_type).await;
                }
            }
            let (failure, messages) = authn::interpret_failure(&response);
            return Err(attempt.fail(failure, messages));
        }

        let auth_record = response
            .auth_record
            .ok_or_else(|| {
                AppError::protocol(format!(
                    "Authenticator '{}' reported success without an auth record",
                    profile.authn.name()
                ))
            })
            .at(LoginStage::Authenticated)?;

        Ok((auth_record, login_name))
    }

    fn submit_bookkeeping(&self, user: &LocalUser) {
        let Some(executor) = &self.background else {
            return;
        };
        let task = RecordAdminCheck::new(self.directory.clone(), user.id, user.admin, Utc::now());
        if !executor.submit(Arc::new(task)) {
            debug!(user_id = %user.id, "Admin check bookkeeping dropped");
        }
    }
}
