//! Database migrations.
//!
//! ```rust,ignore
//! use latchkey::postgres::migrations;
//! use sqlx::PgPool;
//!
//! async fn setup(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::PgPool;

/// Runs the core migrations: `identities` and `otp_challenges`.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/core").run(pool).await
}
