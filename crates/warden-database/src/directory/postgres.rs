//! PostgreSQL user directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_entity::LocalUser;

use super::UserDirectory;

const COLUMNS: &str = "id, external_id, login_name, domain, namespace, first_name, last_name, \
                       email, department, group_ids, admin, active, last_admin_check";

/// Row shape of `local_users`.
#[derive(Debug, sqlx::FromRow)]
struct LocalUserRow {
    id: Uuid,
    external_id: String,
    login_name: String,
    domain: String,
    namespace: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    department: Option<String>,
    group_ids: Vec<String>,
    admin: bool,
    active: bool,
    last_admin_check: Option<DateTime<Utc>>,
}

impl From<LocalUserRow> for LocalUser {
    fn from(row: LocalUserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            external_id: row.external_id,
            login_name: row.login_name,
            domain: row.domain,
            namespace: row.namespace,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            department: row.department,
            group_ids: row.group_ids.into_iter().collect(),
            admin: row.admin,
            active: row.active,
            last_admin_check: row.last_admin_check,
        }
    }
}

/// User directory stored in the `local_users` table.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Creates a directory over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn save_or_update(&self, user: &LocalUser) -> AppResult<LocalUser> {
        let sql = format!(
            "INSERT INTO local_users \
                 (id, external_id, login_name, domain, namespace, first_name, last_name, \
                  email, department, group_ids, admin, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (domain, external_id) DO UPDATE SET \
                 login_name = EXCLUDED.login_name, \
                 namespace = EXCLUDED.namespace, \
                 first_name = EXCLUDED.first_name, \
                 last_name = EXCLUDED.last_name, \
                 email = EXCLUDED.email, \
                 department = EXCLUDED.department, \
                 group_ids = EXCLUDED.group_ids, \
                 active = EXCLUDED.active, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );

        let group_ids: Vec<String> = user.group_ids.iter().cloned().collect();

        sqlx::query_as::<_, LocalUserRow>(&sql)
            .bind(user.id.into_uuid())
            .bind(&user.external_id)
            .bind(&user.login_name)
            .bind(&user.domain)
            .bind(&user.namespace)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.department)
            .bind(&group_ids)
            .bind(user.admin)
            .bind(user.active)
            .fetch_one(&self.pool)
            .await
            .map(LocalUser::from)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save local user", e))
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<LocalUser>> {
        sqlx::query_as::<_, LocalUserRow>(&format!(
            "SELECT {COLUMNS} FROM local_users WHERE id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(LocalUser::from))
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find local user by id", e)
        })
    }

    async fn find_by_external_id(
        &self,
        domain: &str,
        external_id: &str,
    ) -> AppResult<Option<LocalUser>> {
        sqlx::query_as::<_, LocalUserRow>(&format!(
            "SELECT {COLUMNS} FROM local_users WHERE domain = $1 AND external_id = $2"
        ))
        .bind(domain)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(LocalUser::from))
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find local user by external id",
                e,
            )
        })
    }

    async fn update_last_admin_check(
        &self,
        id: UserId,
        admin: bool,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE local_users SET admin = $1, last_admin_check = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(admin)
        .bind(at)
        .bind(id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update last admin check", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Local user {id} not found")));
        }
        Ok(())
    }
}
