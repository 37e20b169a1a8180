use async_trait::async_trait;

use super::{Repository, is_foreign_key_violation};
use crate::config::CandidateScope;
use crate::error::{Result, ServerError};
use crate::item::{Item, ItemWithOwner, NewItem};
use crate::ports::ItemDirectory;
use crate::{ItemId, UserId};

#[async_trait]
impl ItemDirectory for Repository {
    async fn item_owner(&self, item_id: ItemId) -> Result<Option<UserId>> {
        let owner = sqlx::query_scalar::<_, i64>(r#"SELECT user_id FROM items WHERE id = $1"#)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    async fn owned_items(&self, user_id: UserId, scope: CandidateScope) -> Result<Vec<Item>> {
        let query = match scope {
            CandidateScope::All => {
                r#"SELECT id, user_id, title, description, category, image_url, created_at
                FROM items WHERE user_id = $1 ORDER BY id"#
            },
            CandidateScope::Unswiped => {
                r#"SELECT id, user_id, title, description, category, image_url, created_at
                FROM items WHERE user_id = $1
                AND id NOT IN (SELECT item_id FROM swipes WHERE user_id = $1)
                ORDER BY id"#
            },
        };

        let items = sqlx::query_as::<_, Item>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

impl Repository {
    /// Items `user_id` has not swiped yet, newest first.
    pub async fn feed(&self, user_id: UserId, exclude_own: bool) -> Result<Vec<ItemWithOwner>> {
        let items = sqlx::query_as::<_, ItemWithOwner>(
            r#"SELECT i.id, i.user_id, i.title, i.description, i.category, i.image_url,
                i.created_at, u.name AS owner_name
            FROM items i
            JOIN users u ON u.id = i.user_id
            WHERE NOT ($2 AND i.user_id = $1)
            AND i.id NOT IN (SELECT item_id FROM swipes WHERE user_id = $1)
            ORDER BY i.created_at DESC, i.id DESC"#,
        )
        .bind(user_id)
        .bind(exclude_own)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// List a new item owned by `user_id`.
    pub async fn create_item(&self, user_id: UserId, item: NewItem) -> Result<Item> {
        sqlx::query_as::<_, Item>(
            r#"INSERT INTO items (user_id, title, description, category, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, category, image_url, created_at"#,
        )
        .bind(user_id)
        .bind(item.title)
        .bind(item.description)
        .bind(item.category)
        .bind(item.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                ServerError::NotFound("user")
            } else {
                err.into()
            }
        })
    }

    /// Delete an item of `user_id`. Its swipes go with it; an item that is
    /// part of a match cannot be deleted.
    pub async fn delete_item(&self, user_id: UserId, item_id: ItemId) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM items WHERE id = $1 AND user_id = $2"#)
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    ServerError::Conflict("item is part of a match".into())
                } else {
                    err.into()
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("item"));
        }

        Ok(())
    }
}
