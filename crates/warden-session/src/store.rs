//! Session storage keyed by token.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;
use warden_core::AppResult;
use warden_core::types::SecretString;
use warden_entity::{AuthRecord, LocalUser, PrincipalRecord, SessionData};

/// Per-token session artifacts.
///
/// Setters create the session entry on first use. Getters on an unknown
/// token return `None`.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Attaches the owning user.
    async fn set_user(&self, token: &str, user: LocalUser) -> AppResult<()>;

    /// Owning user.
    async fn get_user(&self, token: &str) -> AppResult<Option<LocalUser>>;

    /// Retains the plaintext credential.
    async fn set_password(&self, token: &str, password: SecretString) -> AppResult<()>;

    /// Retained credential.
    async fn get_password(&self, token: &str) -> AppResult<Option<SecretString>>;

    /// Records the login profile.
    async fn set_profile(&self, token: &str, profile_name: &str) -> AppResult<()>;

    /// Stores the auth record.
    async fn set_auth_record(&self, token: &str, record: AuthRecord) -> AppResult<()>;

    /// Stores the principal record.
    async fn set_principal_record(&self, token: &str, record: PrincipalRecord) -> AppResult<()>;

    /// Sets the absolute expiry; `None` means unlimited.
    async fn set_hard_limit(&self, token: &str, limit: Option<DateTime<Utc>>) -> AppResult<()>;

    /// Absolute expiry.
    async fn get_hard_limit(&self, token: &str) -> AppResult<Option<DateTime<Utc>>>;

    /// Touches session bookkeeping.
    async fn refresh(&self, token: &str) -> AppResult<()>;

    /// Snapshot of the whole session.
    async fn get_session(&self, token: &str) -> AppResult<Option<SessionData>>;

    /// Removes a session, returning whether it existed.
    async fn remove(&self, token: &str) -> AppResult<bool>;

    /// Drops sessions past their hard limit or idle beyond `soft_limit`.
    /// Returns the number removed.
    async fn evict_expired(&self, now: DateTime<Utc>, soft_limit: Duration) -> AppResult<usize>;

    /// Number of live sessions.
    async fn len(&self) -> AppResult<usize>;
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionData>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, token: &str, apply: impl FnOnce(&mut SessionData)) {
        let mut entry = self
            .sessions
            .entry(token.to_string())
            .or_insert_with(|| SessionData::new(Utc::now()));
        apply(entry.value_mut());
    }

    fn read<T>(&self, token: &str, read: impl FnOnce(&SessionData) -> Option<T>) -> Option<T> {
        self.sessions.get(token).and_then(|entry| read(entry.value()))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set_user(&self, token: &str, user: LocalUser) -> AppResult<()> {
        self.update(token, |session| session.user = Some(user));
        Ok(())
    }

    async fn get_user(&self, token: &str) -> AppResult<Option<LocalUser>> {
        Ok(self.read(token, |session| session.user.clone()))
    }

    async fn set_password(&self, token: &str, password: SecretString) -> AppResult<()> {
        self.update(token, |session| session.password = Some(password));
        Ok(())
    }

    async fn get_password(&self, token: &str) -> AppResult<Option<SecretString>> {
        let password = self.read(token, |session| session.password.clone());
        if password.is_some() {
            debug!("Retained session credential accessed");
        }
        Ok(password)
    }

    async fn set_profile(&self, token: &str, profile_name: &str) -> AppResult<()> {
        self.update(token, |session| {
            session.profile_name = Some(profile_name.to_string())
        });
        Ok(())
    }

    async fn set_auth_record(&self, token: &str, record: AuthRecord) -> AppResult<()> {
        self.update(token, |session| session.auth_record = Some(record));
        Ok(())
    }

    async fn set_principal_record(&self, token: &str, record: PrincipalRecord) -> AppResult<()> {
        self.update(token, |session| session.principal_record = Some(record));
        Ok(())
    }

    async fn set_hard_limit(&self, token: &str, limit: Option<DateTime<Utc>>) -> AppResult<()> {
        self.update(token, |session| session.hard_limit = limit);
        Ok(())
    }

    async fn get_hard_limit(&self, token: &str) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.read(token, |session| session.hard_limit))
    }

    async fn refresh(&self, token: &str) -> AppResult<()> {
        self.update(token, |session| session.last_seen = Utc::now());
        Ok(())
    }

    async fn get_session(&self, token: &str) -> AppResult<Option<SessionData>> {
        Ok(self.read(token, |session| Some(session.clone())))
    }

    async fn remove(&self, token: &str) -> AppResult<bool> {
        Ok(self.sessions.remove(token).is_some())
    }

    async fn evict_expired(&self, now: DateTime<Utc>, soft_limit: Duration) -> AppResult<usize> {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !session.is_expired(now) && !session.is_idle(now, soft_limit));
        Ok(before.saturating_sub(self.sessions.len()))
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.sessions.len())
    }
}
