use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::map_sqlx_error;
use crate::repository::{ChallengeAttempt, ChallengeRepository, OtpChallenge};
use crate::{AuthError, SecretString};

#[derive(Clone)]
pub struct PostgresChallengeRepository {
    pool: PgPool,
}

impl PostgresChallengeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChallengeRecord {
    phone_number: String,
    code: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    attempts: i32,
}

impl From<ChallengeRecord> for OtpChallenge {
    fn from(row: ChallengeRecord) -> Self {
        OtpChallenge {
            phone_number: row.phone_number,
            code: SecretString::new(row.code),
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            attempts: row.attempts.max(0) as u32,
        }
    }
}

#[async_trait]
impl ChallengeRepository for PostgresChallengeRepository {
    async fn replace(&self, challenge: OtpChallenge) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO otp_challenges (phone_number, code, issued_at, expires_at, attempts) \
             VALUES ($1, $2, $3, $4, 0) \
             ON CONFLICT (phone_number) DO UPDATE \
             SET code = EXCLUDED.code, issued_at = EXCLUDED.issued_at, \
                 expires_at = EXCLUDED.expires_at, attempts = 0",
        )
        .bind(&challenge.phone_number)
        .bind(challenge.code.expose())
        .bind(challenge.issued_at)
        .bind(challenge.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find(&self, phone_number: &str) -> Result<Option<OtpChallenge>, AuthError> {
        let row: Option<ChallengeRecord> = sqlx::query_as(
            "SELECT phone_number, code, issued_at, expires_at, attempts \
             FROM otp_challenges WHERE phone_number = $1",
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn verify_and_consume(
        &self,
        phone_number: &str,
        candidate: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<ChallengeAttempt, AuthError> {
        // The row lock serializes concurrent attempts for one phone
        // number; everything between here and commit is one attempt.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row: Option<ChallengeRecord> = sqlx::query_as(
            "SELECT phone_number, code, issued_at, expires_at, attempts \
             FROM otp_challenges WHERE phone_number = $1 FOR UPDATE",
        )
        .bind(phone_number)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            tx.commit().await.map_err(map_sqlx_error)?;
            return Ok(ChallengeAttempt::Rejected);
        };

        let challenge = OtpChallenge::from(row);

        if challenge.is_expired(now) || challenge.attempts >= max_attempts {
            sqlx::query("DELETE FROM otp_challenges WHERE phone_number = $1")
                .bind(phone_number)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            tx.commit().await.map_err(map_sqlx_error)?;
            return Ok(ChallengeAttempt::Rejected);
        }

        let attempts = challenge.attempts + 1;
        let verified = challenge.code.constant_time_eq(candidate);

        if verified || attempts >= max_attempts {
            sqlx::query("DELETE FROM otp_challenges WHERE phone_number = $1")
                .bind(phone_number)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        } else {
            sqlx::query("UPDATE otp_challenges SET attempts = $1 WHERE phone_number = $2")
                .bind(attempts as i32)
                .bind(phone_number)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(if verified {
            ChallengeAttempt::Verified
        } else {
            ChallengeAttempt::Rejected
        })
    }

    async fn remove(&self, phone_number: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM otp_challenges WHERE phone_number = $1")
            .bind(phone_number)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
