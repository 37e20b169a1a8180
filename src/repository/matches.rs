use async_trait::async_trait;

use super::Repository;
use crate::UserId;
use crate::error::Result;
use crate::matching::{EndpointPair, GuardOutcome, Match, MatchView};
use crate::ports::MatchStore;

#[async_trait]
impl MatchStore for Repository {
    async fn create_if_reciprocal(&self, pair: &EndpointPair) -> Result<GuardOutcome> {
        let (first, second) = (pair.first(), pair.second());
        let mut tx = self.pool.begin().await?;

        // Both right swipes must exist and each swiped item must still belong
        // to the other side. Rows stay locked until the insert commits.
        let swipes = sqlx::query_scalar::<_, i64>(
            r#"SELECT s.id FROM swipes s
            JOIN items i ON i.id = s.item_id
            WHERE s.direction = 'right'
            AND (
                (s.user_id = $1 AND s.item_id = $4 AND i.user_id = $3)
                OR (s.user_id = $3 AND s.item_id = $2 AND i.user_id = $1)
            )
            FOR SHARE OF s, i"#,
        )
        .bind(first.user_id)
        .bind(first.item_id)
        .bind(second.user_id)
        .bind(second.item_id)
        .fetch_all(&mut *tx)
        .await?;

        if swipes.len() < 2 {
            tx.rollback().await?;
            return Ok(GuardOutcome::NotReciprocal);
        }

        let created = sqlx::query_as::<_, Match>(
            r#"INSERT INTO matches (user1_id, item1_id, user2_id, item2_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT matches_endpoint_pair_key DO NOTHING
            RETURNING id, user1_id, user2_id, item1_id, item2_id, created_at"#,
        )
        .bind(first.user_id)
        .bind(first.item_id)
        .bind(second.user_id)
        .bind(second.item_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(match created {
            Some(created) => GuardOutcome::Created(created),
            None => GuardOutcome::AlreadyMatched,
        })
    }

    async fn matches_of(&self, user_id: UserId) -> Result<Vec<MatchView>> {
        let views = sqlx::query_as::<_, MatchView>(
            r#"SELECT m.id, m.user1_id, m.user2_id, m.item1_id, m.item2_id,
                i1.title AS item1_title, i2.title AS item2_title,
                u1.name AS user1_name, u2.name AS user2_name,
                m.created_at
            FROM matches m
            JOIN items i1 ON i1.id = m.item1_id
            JOIN items i2 ON i2.id = m.item2_id
            JOIN users u1 ON u1.id = m.user1_id
            JOIN users u2 ON u2.id = m.user2_id
            WHERE m.user1_id = $1 OR m.user2_id = $1
            ORDER BY m.created_at DESC, m.id DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(views)
    }
}
