use std::sync::Arc;

use crate::error::Result;
use crate::ports::SwipeStore;
use crate::swipe::{Direction, Swipe};
use crate::{ItemId, UserId};

/// Append-only record of swipes.
///
/// Recording a swipe never triggers matching by itself; the caller decides
/// what to do once the write is durable.
#[derive(Clone)]
pub struct SwipeLedger {
    store: Arc<dyn SwipeStore>,
}

impl SwipeLedger {
    /// Create a new [`SwipeLedger`].
    pub fn new(store: Arc<dyn SwipeStore>) -> Self {
        Self { store }
    }

    /// Record the decision of `user_id` on `item_id`.
    ///
    /// A second decision on the same item is rejected, whatever its
    /// direction.
    pub async fn record(
        &self,
        user_id: UserId,
        item_id: ItemId,
        direction: Direction,
    ) -> Result<Swipe> {
        let swipe = self.store.insert_swipe(user_id, item_id, direction).await?;

        metrics::counter!("swipes_recorded_total", "direction" => direction.as_str())
            .increment(1);
        tracing::info!(user_id, item_id, %direction, swipe_id = swipe.id, "swipe recorded");

        Ok(swipe)
    }
}
