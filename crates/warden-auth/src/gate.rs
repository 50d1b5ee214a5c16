//! Login permission and admin evaluation.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use tracing::debug;
use warden_core::AppResult;
use warden_core::config::PermissionConfig;
use warden_core::types::{ObjectId, UserId};
use warden_entity::LocalUser;

/// Actions a permission check can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionGroup {
    /// Opening a session.
    Login,
}

/// One permission question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionQuery {
    /// Local user id.
    pub user_id: UserId,
    /// Login name of the user.
    pub login_name: String,
    /// Flattened group ids of the user.
    pub group_ids: BTreeSet<String>,
    /// Requested action.
    pub action_group: ActionGroup,
    /// Target object.
    pub object_id: ObjectId,
    /// Skip object-level ACL lookup and answer from user and group grants alone.
    pub bypass_object_acl: bool,
}

impl PermissionQuery {
    /// Login permission for `user` on the bottom object.
    pub fn login(user: &LocalUser) -> Self {
        Self {
            user_id: user.id,
            login_name: user.login_name.clone(),
            group_ids: user.group_ids.clone(),
            action_group: ActionGroup::Login,
            object_id: ObjectId::BOTTOM,
            bypass_object_acl: true,
        }
    }
}

/// Permission subsystem consulted by the login flow.
#[async_trait]
pub trait PermissionChecker: Send + Sync + std::fmt::Debug {
    /// Whether the user or one of its groups is granted the action.
    async fn check_user_and_groups_authorization(&self, query: &PermissionQuery)
    -> AppResult<bool>;

    /// Whether the user has administrative privileges.
    async fn is_admin_user(&self, user: &LocalUser) -> AppResult<bool>;
}

/// Grants from configuration.
///
/// Administrators may always log in. Object-level grants are not modelled,
/// so only queries that bypass the object ACL can be granted through
/// `allow_everyone`.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionTable {
    allow_everyone: bool,
    login_users: HashSet<String>,
    login_groups: HashSet<String>,
    admin_users: HashSet<String>,
    admin_groups: HashSet<String>,
}

impl StaticPermissionTable {
    /// Builds the table from `[permissions]`.
    pub fn from_config(config: &PermissionConfig) -> Self {
        Self {
            allow_everyone: config.allow_everyone,
            login_users: config.login_users.iter().cloned().collect(),
            login_groups: config.login_groups.iter().cloned().collect(),
            admin_users: config.admin_users.iter().cloned().collect(),
            admin_groups: config.admin_groups.iter().cloned().collect(),
        }
    }

    fn is_admin(&self, login_name: &str, group_ids: &BTreeSet<String>) -> bool {
        self.admin_users.contains(login_name)
            || group_ids.iter().any(|id| self.admin_groups.contains(id))
    }

    fn grants(&self, action: ActionGroup, query: &PermissionQuery) -> bool {
        match action {
            ActionGroup::Login => {
                (self.allow_everyone && query.bypass_object_acl)
                    || self.login_users.contains(&query.login_name)
                    || query.group_ids.iter().any(|id| self.login_groups.contains(id))
                    || self.is_admin(&query.login_name, &query.group_ids)
            }
        }
    }
}

#[async_trait]
impl PermissionChecker for StaticPermissionTable {
    async fn check_user_and_groups_authorization(
        &self,
        query: &PermissionQuery,
    ) -> AppResult<bool> {
        let granted = self.grants(query.action_group, query);
        debug!(
            user_id = %query.user_id,
            action = ?query.action_group,
            object_id = %query.object_id,
            granted = granted,
            "Permission check"
        );
        Ok(granted)
    }

    async fn is_admin_user(&self, user: &LocalUser) -> AppResult<bool> {
        Ok(self.is_admin(&user.login_name, &user.group_ids))
    }
}
