//! Swipe-to-match engine.
//!
//! Wires the swipe ledger, the reciprocity checker with its match guard and
//! the match catalog over one store.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Matching;
use crate::error::Result;
use crate::matching::{MatchCatalog, MatchGuard, MatchView};
use crate::ports::{CommentSource, ItemDirectory, MatchStore, SwipeStore};
use crate::swipe::{Direction, ReciprocityChecker, Swipe, SwipeLedger};
use crate::{ItemId, UserId};

#[derive(Clone)]
pub struct Engine {
    ledger: SwipeLedger,
    checker: ReciprocityChecker,
    catalog: MatchCatalog,
}

impl Engine {
    /// Create a new [`Engine`] backed by `store`.
    pub fn new<S>(store: Arc<S>, config: &Matching) -> Self
    where
        S: ItemDirectory + SwipeStore + MatchStore + CommentSource + 'static,
    {
        let guard = MatchGuard::new(
            store.clone(),
            Duration::from_millis(config.transaction_timeout_ms),
        );

        Self {
            ledger: SwipeLedger::new(store.clone()),
            checker: ReciprocityChecker::new(
                store.clone(),
                store.clone(),
                guard,
                config.candidate_scope,
            ),
            catalog: MatchCatalog::new(store.clone(), store),
        }
    }

    /// Record a swipe, then run match detection when it is a right swipe.
    ///
    /// Detection completes before this returns. Its failures are logged and
    /// never turn a recorded swipe into an error.
    pub async fn record_swipe(
        &self,
        user_id: UserId,
        item_id: ItemId,
        direction: Direction,
    ) -> Result<Swipe> {
        let swipe = self.ledger.record(user_id, item_id, direction).await?;

        if direction == Direction::Right {
            match self.checker.process_right_swipe(user_id, item_id).await {
                Ok(report) => tracing::debug!(
                    user_id,
                    item_id,
                    created = report.created.len(),
                    already_matched = report.already_matched,
                    failed = report.failed,
                    "reciprocity processed"
                ),
                Err(err) if err.is_storage() => tracing::error!(
                    user_id,
                    item_id,
                    error = %err,
                    "reciprocity processing failed"
                ),
                Err(err) => tracing::warn!(
                    user_id,
                    item_id,
                    error = %err,
                    "reciprocity processing skipped"
                ),
            }
        }

        Ok(swipe)
    }

    /// Matches of `user_id`, newest first.
    pub async fn list_matches(&self, user_id: UserId) -> Result<Vec<MatchView>> {
        self.catalog.list_matches(user_id).await
    }

    pub fn checker(&self) -> &ReciprocityChecker {
        &self.checker
    }
}
