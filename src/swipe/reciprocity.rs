use std::sync::Arc;

use crate::config::CandidateScope;
use crate::error::{Result, ServerError};
use crate::matching::{GuardOutcome, Match, MatchGuard};
use crate::ports::{ItemDirectory, SwipeStore};
use crate::{ItemId, UserId};

/// Items of the swiping user that the owner of the swiped item already liked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Candidates {
    pub owner_id: UserId,
    pub items: Vec<ItemId>,
    /// Lookups that could not be answered by the store.
    pub failed: usize,
}

/// Result of one right-swipe processing pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReciprocityReport {
    pub created: Vec<Match>,
    pub already_matched: usize,
    pub not_reciprocal: usize,
    pub failed: usize,
}

/// Detects reciprocal right swipes and hands each pair to the [`MatchGuard`].
#[derive(Clone)]
pub struct ReciprocityChecker {
    items: Arc<dyn ItemDirectory>,
    swipes: Arc<dyn SwipeStore>,
    guard: MatchGuard,
    scope: CandidateScope,
}

impl ReciprocityChecker {
    /// Create a new [`ReciprocityChecker`].
    pub fn new(
        items: Arc<dyn ItemDirectory>,
        swipes: Arc<dyn SwipeStore>,
        guard: MatchGuard,
        scope: CandidateScope,
    ) -> Self {
        Self {
            items,
            swipes,
            guard,
            scope,
        }
    }

    /// Find the items of `swiping_user` whose reciprocity with
    /// `swiped_item` holds.
    ///
    /// A lookup failing for one candidate is logged and skipped.
    pub async fn find_reciprocal_candidates(
        &self,
        swiping_user: UserId,
        swiped_item: ItemId,
    ) -> Result<Candidates> {
        let owner_id = self
            .items
            .item_owner(swiped_item)
            .await?
            .ok_or(ServerError::NotFound("item"))?;

        let mut candidates = Candidates {
            owner_id,
            ..Default::default()
        };

        // Swiping on your own item cannot produce a match.
        if owner_id == swiping_user {
            return Ok(candidates);
        }

        let owned = self.items.owned_items(swiping_user, self.scope).await?;

        for item in owned {
            match self.swipes.has_swiped_right(owner_id, item.id).await {
                Ok(true) => candidates.items.push(item.id),
                Ok(false) => (),
                Err(err) => {
                    tracing::warn!(
                        owner_id,
                        item_id = item.id,
                        error = %err,
                        "reciprocity lookup failed"
                    );
                    candidates.failed += 1;
                },
            }
        }

        Ok(candidates)
    }

    /// Run match detection for a right swipe of `swiping_user` on
    /// `swiped_item`.
    ///
    /// Every candidate is attempted even when another one fails.
    pub async fn process_right_swipe(
        &self,
        swiping_user: UserId,
        swiped_item: ItemId,
    ) -> Result<ReciprocityReport> {
        let candidates = self
            .find_reciprocal_candidates(swiping_user, swiped_item)
            .await?;

        let mut report = ReciprocityReport {
            failed: candidates.failed,
            ..Default::default()
        };

        for candidate in candidates.items {
            let outcome = self
                .guard
                .create_match_if_reciprocal(
                    swiping_user,
                    candidates.owner_id,
                    candidate,
                    swiped_item,
                )
                .await;

            match outcome {
                Ok(GuardOutcome::Created(created)) => report.created.push(created),
                Ok(GuardOutcome::AlreadyMatched) => report.already_matched += 1,
                Ok(GuardOutcome::NotReciprocal) => report.not_reciprocal += 1,
                Err(err) => {
                    tracing::error!(
                        user_id = swiping_user,
                        item_id = candidate,
                        other_user_id = candidates.owner_id,
                        other_item_id = swiped_item,
                        error = %err,
                        "match creation failed"
                    );
                    report.failed += 1;
                },
            }
        }

        Ok(report)
    }
}
