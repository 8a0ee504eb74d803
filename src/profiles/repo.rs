use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Application-level record of a principal. Exactly one per principal id;
/// created at registration, or lazily by the role resolver.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub email_verified: bool,
    pub created_at: OffsetDateTime,
}

const PROFILE_COLS: &str =
    "id, email, full_name, phone_number, password_hash, role, email_verified, created_at";

impl Profile {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLS} FROM profiles WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        full_name: &str,
        phone_number: &str,
        password_hash: &str,
    ) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (email, full_name, phone_number, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROFILE_COLS}
            "#
        ))
        .bind(email)
        .bind(full_name)
        .bind(phone_number)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// First-login provisioning: materialize a default-normal profile for a
    /// principal the store has never seen. Contact fields start empty.
    pub async fn create_default(
        db: &PgPool,
        id: Uuid,
        email: &str,
        email_verified: bool,
    ) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (id, email, full_name, phone_number, password_hash, email_verified)
            VALUES ($1, $2, '', '', '', $3)
            RETURNING {PROFILE_COLS}
            "#
        ))
        .bind(id)
        .bind(email)
        .bind(email_verified)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLS} FROM profiles ORDER BY created_at ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn set_role(db: &PgPool, id: Uuid, role: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE profiles SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_email_verified(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE profiles SET email_verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_password_hash(db: &PgPool, id: Uuid, hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE profiles SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
