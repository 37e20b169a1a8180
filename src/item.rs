use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ItemId, UserId};

/// Item listed for barter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: ItemId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Item joined with its owner's display name, as shown in the browse feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemWithOwner {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: Item,
    pub owner_name: String,
}

/// Fields of an item about to be created.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
}
