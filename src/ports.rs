//! Storage ports consumed by the matching engine.
//!
//! Every port is implemented against PostgreSQL by
//! [`crate::repository::Repository`]; tests substitute an in-memory store.

use async_trait::async_trait;

use crate::comment::Comment;
use crate::config::CandidateScope;
use crate::error::Result;
use crate::item::Item;
use crate::matching::{EndpointPair, GuardOutcome, MatchView};
use crate::swipe::{Direction, Swipe};
use crate::{ItemId, MatchId, UserId};

/// Read access to item ownership.
#[async_trait]
pub trait ItemDirectory: Send + Sync {
    /// Owner of an item, `None` when the item does not exist.
    async fn item_owner(&self, item_id: ItemId) -> Result<Option<UserId>>;

    /// Items owned by `user_id`, restricted by `scope`.
    async fn owned_items(
        &self,
        user_id: UserId,
        scope: CandidateScope,
    ) -> Result<Vec<Item>>;
}

/// Append-only swipe persistence.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    /// Persist a swipe.
    ///
    /// Fails with [`crate::ServerError::Conflict`] when the pair already has
    /// a swipe and with [`crate::ServerError::NotFound`] when the item does
    /// not exist.
    async fn insert_swipe(
        &self,
        user_id: UserId,
        item_id: ItemId,
        direction: Direction,
    ) -> Result<Swipe>;

    /// Whether `user_id` swiped right on `item_id`.
    async fn has_swiped_right(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<bool>;
}

/// Match persistence.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Atomically re-check reciprocity and insert the match once.
    async fn create_if_reciprocal(
        &self,
        pair: &EndpointPair,
    ) -> Result<GuardOutcome>;

    /// Matches involving `user_id`, newest first, without comments.
    async fn matches_of(&self, user_id: UserId) -> Result<Vec<MatchView>>;
}

/// Comment threads attached to matches.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Comments of a match, oldest first.
    async fn comments_of(&self, match_id: MatchId) -> Result<Vec<Comment>>;
}
