use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A comment on a recipe. New comments stay hidden from the recipe page
/// until a moderator approves them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: Uuid,
    pub recipe_id: Uuid,
    pub author_user_id: Uuid,
    pub author_username: String,
    pub body: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// A comment waiting for moderation, with enough context to judge it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingComment {
    pub comment_id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_title: String,
    pub author_username: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl PendingComment {
    pub fn preview(&self) -> String {
        const PREVIEW_CHARS: usize = 50;

        if self.body.chars().count() > PREVIEW_CHARS {
            let truncated: String = self.body.chars().take(PREVIEW_CHARS).collect();
            format!("{truncated}...")
        } else {
            self.body.clone()
        }
    }
}

impl Comment {
    #[tracing::instrument(err, skip(pool, body))]
    pub async fn create(
        pool: &PgPool,
        recipe_id: Uuid,
        author_user_id: Uuid,
        body: &str,
    ) -> Result<Self> {
        let comment = sqlx::query_as::<_, Comment>(
            "
            WITH c AS (
                INSERT INTO comments (recipe_id, author_user_id, body, approved)
                VALUES ($1, $2, $3, FALSE)
                RETURNING *
            )
            SELECT
                c.comment_id,
                c.recipe_id,
                c.author_user_id,
                u.username AS author_username,
                c.body,
                c.approved,
                c.created_at
            FROM c
            JOIN Users u ON u.user_id = c.author_user_id
            ",
        )
        .bind(recipe_id)
        .bind(author_user_id)
        .bind(body)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Only finds the comment when it belongs to `recipe_id`.
    pub async fn get_for_recipe(
        pool: &PgPool,
        recipe_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Self>> {
        let comment = sqlx::query_as::<_, Comment>(
            "
            SELECT
                c.comment_id,
                c.recipe_id,
                c.author_user_id,
                u.username AS author_username,
                c.body,
                c.approved,
                c.created_at
            FROM comments c
            JOIN Users u ON u.user_id = c.author_user_id
            WHERE c.recipe_id = $1 AND c.comment_id = $2
            ",
        )
        .bind(recipe_id)
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    pub async fn list_approved_for_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Self>> {
        let comments = sqlx::query_as::<_, Comment>(
            "
            SELECT
                c.comment_id,
                c.recipe_id,
                c.author_user_id,
                u.username AS author_username,
                c.body,
                c.approved,
                c.created_at
            FROM comments c
            JOIN Users u ON u.user_id = c.author_user_id
            WHERE c.recipe_id = $1 AND c.approved
            ORDER BY c.created_at DESC, c.comment_id
            ",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    pub async fn count_approved_for_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE recipe_id = $1 AND approved",
        )
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Edits keep whatever approval the comment already had.
    #[tracing::instrument(err, skip(self, pool, body), fields(comment_id = %self.comment_id))]
    pub async fn update_body(&self, pool: &PgPool, body: &str) -> Result<()> {
        sqlx::query("UPDATE comments SET body = $2 WHERE comment_id = $1")
            .bind(self.comment_id)
            .bind(body)
            .execute(pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(err, skip(pool))]
    pub async fn delete(pool: &PgPool, comment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest first, like every other comment listing.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<PendingComment>> {
        let pending = sqlx::query_as::<_, PendingComment>(
            "
            SELECT
                c.comment_id,
                c.recipe_id,
                r.title AS recipe_title,
                u.username AS author_username,
                c.body,
                c.created_at
            FROM comments c
            JOIN recipes r ON r.recipe_id = c.recipe_id
            JOIN Users u ON u.user_id = c.author_user_id
            WHERE NOT c.approved
            ORDER BY c.created_at DESC, c.comment_id DESC
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(pending)
    }

    pub async fn count_pending(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE NOT approved")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Returns how many comments changed from pending to approved.
    #[tracing::instrument(err, skip(pool))]
    pub async fn approve(pool: &PgPool, comment_ids: &[Uuid]) -> Result<u64> {
        if comment_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "
            UPDATE comments
            SET approved = TRUE
            WHERE comment_id = ANY($1) AND NOT approved
            ",
        )
        .bind(comment_ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooking::recipe::{tests::fields, Recipe};
    use crate::users::User;

    async fn recipe_and_user(pool: &PgPool) -> (Recipe, User) {
        let author = User::get_or_create_by_username(pool, "chef").await.unwrap();
        let recipe = Recipe::create(pool, author.user_id, &fields("Focaccia"))
            .await
            .unwrap();
        let commenter = User::get_or_create_by_username(pool, "taster").await.unwrap();

        (recipe, commenter)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn new_comments_wait_for_approval(pool: PgPool) {
        let (recipe, commenter) = recipe_and_user(&pool).await;

        let comment = Comment::create(
            &pool,
            recipe.recipe_id,
            commenter.user_id,
            "Lovely crumb, will bake again",
        )
        .await
        .unwrap();
        assert!(!comment.approved);
        assert_eq!(comment.author_username, "taster");

        assert!(Comment::list_approved_for_recipe(&pool, recipe.recipe_id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(Comment::count_pending(&pool).await.unwrap(), 1);

        let pending = Comment::list_pending(&pool).await.unwrap();
        assert_eq!(pending[0].recipe_title, "Focaccia");

        assert_eq!(Comment::approve(&pool, &[comment.comment_id]).await.unwrap(), 1);
        assert_eq!(Comment::approve(&pool, &[comment.comment_id]).await.unwrap(), 0);

        let visible = Comment::list_approved_for_recipe(&pool, recipe.recipe_id)
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(
            Comment::count_approved_for_recipe(&pool, recipe.recipe_id)
                .await
                .unwrap(),
            1
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn pending_queue_lists_newest_first(pool: PgPool) {
        let (recipe, commenter) = recipe_and_user(&pool).await;
        let older = Comment::create(&pool, recipe.recipe_id, commenter.user_id, "First attempt")
            .await
            .unwrap();
        sqlx::query(
            "UPDATE comments SET created_at = created_at - interval '1 hour' WHERE comment_id = $1",
        )
        .bind(older.comment_id)
        .execute(&pool)
        .await
        .unwrap();
        let newer = Comment::create(&pool, recipe.recipe_id, commenter.user_id, "Second attempt")
            .await
            .unwrap();

        let pending: Vec<Uuid> = Comment::list_pending(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.comment_id)
            .collect();

        assert_eq!(pending, vec![newer.comment_id, older.comment_id]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn editing_keeps_approval(pool: PgPool) {
        let (recipe, commenter) = recipe_and_user(&pool).await;
        let comment = Comment::create(
            &pool,
            recipe.recipe_id,
            commenter.user_id,
            "Needs more salt I think",
        )
        .await
        .unwrap();
        Comment::approve(&pool, &[comment.comment_id]).await.unwrap();

        comment
            .update_body(&pool, "Perfect after adding more salt")
            .await
            .unwrap();

        let reloaded = Comment::get_for_recipe(&pool, recipe.recipe_id, comment.comment_id)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.approved);
        assert_eq!(reloaded.body, "Perfect after adding more salt");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn comments_are_scoped_to_their_recipe(pool: PgPool) {
        let (recipe, commenter) = recipe_and_user(&pool).await;
        let other = Recipe::create(&pool, commenter.user_id, &fields("Other bread"))
            .await
            .unwrap();
        let comment = Comment::create(
            &pool,
            recipe.recipe_id,
            commenter.user_id,
            "Great with soup too",
        )
        .await
        .unwrap();

        assert!(Comment::get_for_recipe(&pool, other.recipe_id, comment.comment_id)
            .await
            .unwrap()
            .is_none());

        Recipe::delete(&pool, recipe.recipe_id).await.unwrap();
        assert_eq!(Comment::count_pending(&pool).await.unwrap(), 0);
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let pending = PendingComment {
            comment_id: Uuid::new_v4(),
            recipe_id: Uuid::new_v4(),
            recipe_title: "Soup".to_string(),
            author_username: "taster".to_string(),
            body: "a".repeat(60),
            created_at: Utc::now(),
        };

        assert_eq!(pending.preview(), format!("{}...", "a".repeat(50)));
    }
}
