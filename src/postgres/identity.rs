use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::map_sqlx_error;
use crate::repository::{Identity, IdentityPatch, IdentityRepository, NewIdentity};
use crate::AuthError;

const IDENTITY_COLUMNS: &str = "id, username, email, phone_number, hashed_password, full_name, \
     is_active, is_admin, phone_verified, email_verified, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Option<Identity>, AuthError> {
        let query =
            format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE {column} = $1");
        let row: Option<IdentityRecord> = sqlx::query_as(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }
}

#[derive(FromRow)]
struct IdentityRecord {
    id: i64,
    username: String,
    email: String,
    phone_number: Option<String>,
    hashed_password: String,
    full_name: Option<String>,
    is_active: bool,
    is_admin: bool,
    phone_verified: bool,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IdentityRecord> for Identity {
    fn from(row: IdentityRecord) -> Self {
        Identity {
            id: row.id,
            username: row.username,
            email: row.email,
            phone_number: row.phone_number,
            hashed_password: row.hashed_password,
            full_name: row.full_name,
            is_active: row.is_active,
            is_admin: row.is_admin,
            phone_verified: row.phone_verified,
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AuthError> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1");
        let row: Option<IdentityRecord> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AuthError> {
        self.find_by("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        self.find_by("email", email).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Identity>, AuthError> {
        self.find_by("phone_number", phone_number).await
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity, AuthError> {
        let query = format!(
            "INSERT INTO identities (username, email, phone_number, hashed_password, full_name) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {IDENTITY_COLUMNS}"
        );
        let row: IdentityRecord = sqlx::query_as(&query)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.phone_number)
            .bind(&new.hashed_password)
            .bind(&new.full_name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, patch: IdentityPatch) -> Result<Identity, AuthError> {
        // COALESCE keeps the stored value wherever the patch is empty, so
        // this stays a single round trip.
        let query = format!(
            "UPDATE identities SET \
                 username = COALESCE($1, username), \
                 email = COALESCE($2, email), \
                 phone_number = COALESCE($3, phone_number), \
                 hashed_password = COALESCE($4, hashed_password), \
                 full_name = COALESCE($5, full_name), \
                 updated_at = NOW() \
             WHERE id = $6 RETURNING {IDENTITY_COLUMNS}"
        );
        let row: Option<IdentityRecord> = sqlx::query_as(&query)
            .bind(&patch.username)
            .bind(&patch.email)
            .bind(&patch.phone_number)
            .bind(&patch.hashed_password)
            .bind(&patch.full_name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(Into::into).ok_or_else(|| {
            AuthError::StoreUnavailable(format!("identity {id} missing during update"))
        })
    }

    async fn mark_phone_verified(&self, id: i64) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE identities SET phone_verified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn mark_email_verified(&self, id: i64) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE identities SET email_verified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
