use async_trait::async_trait;

use super::{Repository, missing_reference};
use crate::comment::Comment;
use crate::error::{Result, ServerError};
use crate::ports::CommentSource;
use crate::{MatchId, UserId};

#[async_trait]
impl CommentSource for Repository {
    async fn comments_of(&self, match_id: MatchId) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"SELECT c.id, c.match_id, c.user_id, u.name AS user_name, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.match_id = $1
            ORDER BY c.created_at ASC, c.id ASC"#,
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}

impl Repository {
    /// Fail unless `user_id` is one of the two sides of `match_id`.
    pub async fn ensure_participant(&self, match_id: MatchId, user_id: UserId) -> Result<()> {
        let participant = sqlx::query_scalar::<_, bool>(
            r#"SELECT user1_id = $2 OR user2_id = $2 FROM matches WHERE id = $1"#,
        )
        .bind(match_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match participant {
            None => Err(ServerError::NotFound("match")),
            Some(false) => Err(ServerError::Forbidden(
                "only participants of a match can access its comments".into(),
            )),
            Some(true) => Ok(()),
        }
    }

    /// Post a comment on a match thread.
    pub async fn create_comment(
        &self,
        match_id: MatchId,
        user_id: UserId,
        content: &str,
    ) -> Result<Comment> {
        self.ensure_participant(match_id, user_id).await?;

        sqlx::query_as::<_, Comment>(
            r#"WITH inserted AS (
                INSERT INTO comments (match_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, match_id, user_id, content, created_at
            )
            SELECT c.id, c.match_id, c.user_id, u.name AS user_name, c.content, c.created_at
            FROM inserted c
            JOIN users u ON u.id = c.user_id"#,
        )
        .bind(match_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| missing_reference(err, "comments_match_id_fkey", "match"))
    }
}
