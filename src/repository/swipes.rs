use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Repository, is_unique_violation, missing_reference};
use crate::error::{Result, ServerError};
use crate::ports::SwipeStore;
use crate::swipe::{Direction, Swipe};
use crate::{ItemId, UserId};

#[derive(sqlx::FromRow)]
struct SwipeRecord {
    id: i64,
    user_id: UserId,
    item_id: ItemId,
    direction: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SwipeRecord> for Swipe {
    type Error = ServerError;

    fn try_from(record: SwipeRecord) -> Result<Self> {
        Ok(Swipe {
            id: record.id,
            user_id: record.user_id,
            item_id: record.item_id,
            direction: record.direction.parse().map_err(|err| ServerError::Internal {
                details: format!("swipe {} has direction {:?}", record.id, record.direction),
                source: Some(Box::new(err)),
            })?,
            created_at: record.created_at,
        })
    }
}

#[async_trait]
impl SwipeStore for Repository {
    async fn insert_swipe(
        &self,
        user_id: UserId,
        item_id: ItemId,
        direction: Direction,
    ) -> Result<Swipe> {
        let record = sqlx::query_as::<_, SwipeRecord>(
            r#"INSERT INTO swipes (user_id, item_id, direction)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, item_id, direction, created_at"#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(direction.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ServerError::Conflict("item already swiped".into())
            } else {
                missing_reference(err, "swipes_item_id_fkey", "item")
            }
        })?;

        record.try_into()
    }

    async fn has_swiped_right(&self, user_id: UserId, item_id: ItemId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (
                SELECT 1 FROM swipes
                WHERE user_id = $1 AND item_id = $2 AND direction = 'right'
            )"#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
