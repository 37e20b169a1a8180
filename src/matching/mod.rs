//! Match detection results and read models.
mod catalog;
mod guard;

pub use catalog::*;
pub use guard::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::{ItemId, MatchId, UserId};

/// Persisted reciprocal pair. `item1_id` belongs to `user1_id` and
/// `item2_id` to `user2_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: MatchId,
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub item1_id: ItemId,
    pub item2_id: ItemId,
    pub created_at: DateTime<Utc>,
}

/// Match enriched for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchView {
    pub id: MatchId,
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub item1_id: ItemId,
    pub item2_id: ItemId,
    pub item1_title: String,
    pub item2_title: String,
    pub user1_name: String,
    pub user2_name: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// One side of a match: a user and the item they bring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    pub user_id: UserId,
    pub item_id: ItemId,
}

impl Endpoint {
    pub fn new(user_id: UserId, item_id: ItemId) -> Self {
        Self { user_id, item_id }
    }
}

/// Order-independent pair of endpoints.
///
/// Endpoints are kept sorted by `(user_id, item_id)`, so both argument
/// orders produce the same value and the same stored columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EndpointPair {
    first: Endpoint,
    second: Endpoint,
}

impl EndpointPair {
    /// Canonicalize two endpoints. `None` when both sides share a user or an
    /// item.
    pub fn new(a: Endpoint, b: Endpoint) -> Option<Self> {
        if a.user_id == b.user_id || a.item_id == b.item_id {
            return None;
        }

        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Some(Self { first, second })
    }

    pub fn first(&self) -> Endpoint {
        self.first
    }

    pub fn second(&self) -> Endpoint {
        self.second
    }

    pub fn involves_item(&self, item_id: ItemId) -> bool {
        self.first.item_id == item_id || self.second.item_id == item_id
    }
}

/// What the [`MatchGuard`] did with a pair.
#[derive(Clone, Debug, PartialEq)]
pub enum GuardOutcome {
    Created(Match),
    AlreadyMatched,
    NotReciprocal,
}

impl GuardOutcome {
    pub fn reason(&self) -> &'static str {
        match self {
            GuardOutcome::Created(_) => "created",
            GuardOutcome::AlreadyMatched => "already_matched",
            GuardOutcome::NotReciprocal => "not_reciprocal",
        }
    }
}
