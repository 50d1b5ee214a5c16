//! Session issuance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use warden_core::AppResult;
use warden_core::config::SessionConfig;
use warden_core::types::SecretString;
use warden_entity::{AuthRecord, LocalUser, PrincipalRecord};
use warden_session::{SessionStore, TokenGenerator};

/// Everything a new session is associated with.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub profile_name: String,
    pub user: LocalUser,
    pub auth_record: AuthRecord,
    pub principal_record: PrincipalRecord,
    /// Password of the request, if it carried one.
    pub password: Option<SecretString>,
}

/// Generates session tokens and attaches login artifacts to them.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    store: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenGenerator>,
    hard_limit_minutes: u32,
    retain_password: bool,
}

impl SessionIssuer {
    /// Creates an issuer writing to `store`.
    pub fn new(
        store: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenGenerator>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            hard_limit_minutes: config.hard_limit_minutes,
            retain_password: config.retain_password,
        }
    }

    /// The store sessions are written to.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Issues a session for `grant` and returns its token.
    ///
    /// A token generation error is the fatal random-source condition. If the
    /// store fails midway the partial session is removed.
    pub async fn issue(&self, grant: SessionGrant) -> AppResult<String> {
        let token = self.tokens.generate()?;
        if let Err(e) = self.attach(&token, grant).await {
            if let Err(cleanup) = self.store.remove(&token).await {
                warn!(error = %cleanup, "Failed to remove partially attached session");
            }
            return Err(e);
        }
        Ok(token)
    }

    async fn attach(&self, token: &str, grant: SessionGrant) -> AppResult<()> {
        let hard_limit =
            negotiate_hard_limit(Utc::now(), self.hard_limit_minutes, &grant.auth_record);

        self.store.set_user(token, grant.user).await?;
        self.store.refresh(token).await?;
        self.store.set_profile(token, &grant.profile_name).await?;
        self.store.set_auth_record(token, grant.auth_record).await?;
        self.store
            .set_principal_record(token, grant.principal_record)
            .await?;
        match grant.password {
            Some(password) if self.retain_password => {
                self.store.set_password(token, password).await?;
            }
            _ => {}
        }
        self.store.set_hard_limit(token, hard_limit).await?;

        debug!(
            profile = %grant.profile_name,
            hard_limit = ?hard_limit,
            "Session attached"
        );
        Ok(())
    }
}

/// Session expiry: the earlier of `now + hard_limit_minutes` (unless the
/// limit is zero) and the auth record's `VALID_TO`. `None` means unlimited.
/// An unparsable `VALID_TO` is logged and ignored.
pub fn negotiate_hard_limit(
    now: DateTime<Utc>,
    hard_limit_minutes: u32,
    auth_record: &AuthRecord,
) -> Option<DateTime<Utc>> {
    let configured =
        (hard_limit_minutes > 0).then(|| now + Duration::minutes(i64::from(hard_limit_minutes)));

    let valid_to = match auth_record.valid_to() {
        Some(Ok(valid_to)) => Some(valid_to),
        Some(Err(e)) => {
            warn!(
                principal = auth_record.principal().unwrap_or_default(),
                error = %e,
                "Ignoring unparsable VALID_TO"
            );
            None
        }
        None => None,
    };

    match (configured, valid_to) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
