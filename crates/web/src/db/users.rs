//! Staff user repository.
//!
//! Users live in `app_user`; their permissions live in `user_permission`,
//! one row per (user, resource) with a unique constraint, so the
//! at-most-one-entry-per-resource invariant is enforced by the schema and a
//! re-grant replaces the previous actions instead of appending.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use url::Url;

use itadaki_core::{
    Action, CandidateId, CompanyId, Email, Permission, PermissionSet, Resource, UserId, UserRole,
    UserStatus,
};

use super::RepositoryError;
use crate::models::{NewUser, UpdateUser, User};

const USER_COLUMNS: &str = "id, email, display_name, role, status, phone, avatar_url, \
                            assigned_candidates, assigned_companies, last_login_at, \
                            created_at, updated_at";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    display_name: String,
    role: String,
    status: String,
    phone: Option<String>,
    avatar_url: Option<String>,
    assigned_candidates: Vec<i64>,
    assigned_companies: Vec<i64>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, permissions: PermissionSet) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: UserRole = self.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;
        let status: UserStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        let avatar_url = self
            .avatar_url
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid avatar_url in database: {e}"))
                })
            })
            .transpose()?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            display_name: self.display_name,
            role,
            status,
            phone: self.phone,
            avatar_url,
            permissions,
            assigned_candidates: self
                .assigned_candidates
                .into_iter()
                .map(CandidateId::new)
                .collect(),
            assigned_companies: self
                .assigned_companies
                .into_iter()
                .map(CompanyId::new)
                .collect(),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Internal row type for permission queries.
#[derive(Debug, sqlx::FromRow)]
struct PermissionRow {
    user_id: i64,
    resource: String,
    actions: Vec<String>,
}

impl PermissionRow {
    fn into_permission(self) -> Result<Permission, RepositoryError> {
        let resource: Resource = self.resource.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid resource in database: {e}"))
        })?;
        let actions = self
            .actions
            .iter()
            .map(|raw| {
                raw.parse::<Action>().map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid action in database: {e}"))
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Permission { resource, actions })
    }
}

/// Repository for staff user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users with their permissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let permission_rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT user_id, resource, actions FROM user_permission",
        )
        .fetch_all(self.pool)
        .await?;

        let mut by_user: HashMap<i64, PermissionSet> = HashMap::new();
        for row in permission_rows {
            let user_id = row.user_id;
            let permission = row.into_permission()?;
            by_user.entry(user_id).or_default().grant(permission);
        }

        rows.into_iter()
            .map(|row| {
                let permissions = by_user.remove(&row.id).unwrap_or_default();
                row.into_user(permissions)
            })
            .collect()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let permissions = self.load_permissions(UserId::new(row.id)).await?;
                row.into_user(permissions).map(Some)
            }
        }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let permissions = self.load_permissions(UserId::new(row.id)).await?;
                row.into_user(permissions).map(Some)
            }
        }
    }

    /// Count users who may sign in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM app_user WHERE status = 'active'")
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Create a new user with their initial permissions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO app_user (email, display_name, role, status, phone)
             VALUES ($1, $2, $3, 'active', $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.email.as_str())
        .bind(&new_user.display_name)
        .bind(new_user.role.to_string())
        .bind(new_user.phone.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let user_id = UserId::new(row.id);
        for permission in new_user.permissions.iter() {
            let actions: Vec<String> =
                permission.actions.iter().map(ToString::to_string).collect();
            sqlx::query(
                "INSERT INTO user_permission (user_id, resource, actions) VALUES ($1, $2, $3)",
            )
            .bind(user_id.as_i64())
            .bind(permission.resource.to_string())
            .bind(&actions)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        row.into_user(new_user.permissions.clone())
    }

    /// Update a user from the full edit payload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: UserId, update: &UpdateUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE app_user
             SET display_name = $1, role = $2, status = $3, phone = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&update.display_name)
        .bind(update.role.to_string())
        .bind(update.status.to_string())
        .bind(update.phone.as_deref())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let permissions = self.load_permissions(id).await?;
        row.into_user(permissions)
    }

    /// Record a successful sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn record_login(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE app_user SET last_login_at = NOW() WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Load the permission set for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn load_permissions(&self, id: UserId) -> Result<PermissionSet, RepositoryError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT user_id, resource, actions FROM user_permission WHERE user_id = $1",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(PermissionRow::into_permission)
            .collect()
    }

    /// Grant a permission, replacing any existing entry for the resource.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user doesn't exist, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn grant_permission(
        &self,
        id: UserId,
        permission: &Permission,
    ) -> Result<(), RepositoryError> {
        let actions: Vec<String> = permission.actions.iter().map(ToString::to_string).collect();
        sqlx::query(
            "INSERT INTO user_permission (user_id, resource, actions)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, resource) DO UPDATE SET actions = EXCLUDED.actions",
        )
        .bind(id.as_i64())
        .bind(permission.resource.to_string())
        .bind(&actions)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict("user does not exist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }
}
