use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Finds the user with this username, creating it on first sight.
    #[tracing::instrument(err, skip(pool))]
    pub async fn get_or_create_by_username(pool: &PgPool, username: &str) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            "
            INSERT INTO Users (username)
            VALUES ($1)
            ON CONFLICT (username) DO UPDATE SET updated_at = Users.updated_at
            RETURNING user_id, username, is_staff, created_at, updated_at
            ",
        )
        .bind(username)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            "
            SELECT user_id, username, is_staff, created_at, updated_at
            FROM Users
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Returns false when no user has this username.
    #[tracing::instrument(err, skip(pool))]
    pub async fn set_staff(pool: &PgPool, username: &str, is_staff: bool) -> Result<bool> {
        let result = sqlx::query(
            "
            UPDATE Users
            SET is_staff = $2, updated_at = NOW()
            WHERE username = $1
            ",
        )
        .bind(username)
        .bind(is_staff)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    async fn get_or_create_is_idempotent(pool: PgPool) {
        let first = User::get_or_create_by_username(&pool, "julia").await.unwrap();
        let second = User::get_or_create_by_username(&pool, "julia").await.unwrap();

        assert_eq!(first.user_id, second.user_id);
        assert!(!first.is_staff);
        assert_eq!(User::count(&pool).await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn set_staff_reports_unknown_users(pool: PgPool) {
        let user = User::get_or_create_by_username(&pool, "moderator").await.unwrap();

        assert!(User::set_staff(&pool, "moderator", true).await.unwrap());
        assert!(!User::set_staff(&pool, "nobody", true).await.unwrap());

        let reloaded = User::get_by_id(&pool, user.user_id).await.unwrap().unwrap();
        assert!(reloaded.is_staff);
    }
}
