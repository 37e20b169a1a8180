use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, ServerError};
use crate::matching::{Endpoint, EndpointPair, GuardOutcome};
use crate::ports::MatchStore;
use crate::{ItemId, UserId};

/// Creates a match at most once per reciprocal pair.
///
/// The store re-checks reciprocity and inserts inside one transaction; the
/// canonical [`EndpointPair`] backs that with a uniqueness constraint, so
/// concurrent calls for the same pair in either order leave a single row.
#[derive(Clone)]
pub struct MatchGuard {
    store: Arc<dyn MatchStore>,
    deadline: Duration,
}

impl MatchGuard {
    /// Create a new [`MatchGuard`].
    pub fn new(store: Arc<dyn MatchStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Pair `item_a` of `user_a` with `item_b` of `user_b` if both users
    /// swiped right on the other's item.
    ///
    /// Missing reciprocity and an existing match are normal outcomes, not
    /// errors. An unanswered transaction past the deadline is dropped, which
    /// rolls it back.
    pub async fn create_match_if_reciprocal(
        &self,
        user_a: UserId,
        user_b: UserId,
        item_a: ItemId,
        item_b: ItemId,
    ) -> Result<GuardOutcome> {
        let pair = EndpointPair::new(
            Endpoint::new(user_a, item_a),
            Endpoint::new(user_b, item_b),
        );

        let outcome = match pair {
            // A pair sharing a user or an item can never be reciprocal.
            None => GuardOutcome::NotReciprocal,
            Some(pair) => self.create_within_deadline(&pair).await?,
        };

        match &outcome {
            GuardOutcome::Created(created) => {
                metrics::counter!("matches_created_total").increment(1);
                tracing::info!(
                    match_id = created.id,
                    user1_id = created.user1_id,
                    item1_id = created.item1_id,
                    user2_id = created.user2_id,
                    item2_id = created.item2_id,
                    "match created"
                );
            },
            noop => {
                metrics::counter!("match_guard_noop_total", "reason" => noop.reason())
                    .increment(1);
                tracing::debug!(
                    user_a,
                    user_b,
                    item_a,
                    item_b,
                    reason = noop.reason(),
                    "no match created"
                );
            },
        }

        Ok(outcome)
    }

    async fn create_within_deadline(
        &self,
        pair: &EndpointPair,
    ) -> Result<GuardOutcome> {
        match tokio::time::timeout(
            self.deadline,
            self.store.create_if_reciprocal(pair),
        )
        .await
        {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(err)) => {
                metrics::counter!("match_guard_failures_total").increment(1);
                Err(err)
            },
            Err(_) => {
                metrics::counter!("match_guard_failures_total").increment(1);
                Err(ServerError::Timeout(self.deadline.as_millis() as u64))
            },
        }
    }
}
