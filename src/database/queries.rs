use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{GenerationRecord, NewGenerationRecord, User};

const USER_COLUMNS: &str =
    "id, email, password_hash, is_verified, otp_code, otp_expires_at, created_at, updated_at";

const RECORD_COLUMNS: &str = "id, user_id, prompt, style, image_urls, created_at";

pub struct UserQueries;

impl UserQueries {
    pub async fn create_user(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        otp_code: &str,
        otp_expires_at: DateTime<Utc>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, otp_code, otp_expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(otp_code)
        .bind(otp_expires_at)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Issues a fresh OTP for a still-unverified account.
    pub async fn set_otp(
        pool: &PgPool,
        id: Uuid,
        otp_code: &str,
        otp_expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET otp_code = $1, otp_expires_at = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(otp_code)
        .bind(otp_expires_at)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE, otp_code = NULL, otp_expires_at = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}

pub struct GenerationQueries;

impl GenerationQueries {
    pub async fn insert(pool: &PgPool, record: &NewGenerationRecord) -> Result<GenerationRecord> {
        let record = sqlx::query_as::<_, GenerationRecord>(&format!(
            r#"
            INSERT INTO generation_records (user_id, prompt, style, image_urls)
            VALUES ($1, $2, $3, $4)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record.user_id)
        .bind(&record.prompt)
        .bind(record.style.as_str())
        .bind(&record.image_urls)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Count of records in the half-open range `[start, end)`.
    pub async fn count_for_user_between(
        pool: &PgPool,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM generation_records
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenerationRecord>> {
        let records = sqlx::query_as::<_, GenerationRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM generation_records
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
