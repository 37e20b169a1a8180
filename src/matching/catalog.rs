use std::sync::Arc;

use crate::UserId;
use crate::error::Result;
use crate::matching::MatchView;
use crate::ports::{CommentSource, MatchStore};

/// Read side of matches.
#[derive(Clone)]
pub struct MatchCatalog {
    matches: Arc<dyn MatchStore>,
    comments: Arc<dyn CommentSource>,
}

impl MatchCatalog {
    /// Create a new [`MatchCatalog`].
    pub fn new(matches: Arc<dyn MatchStore>, comments: Arc<dyn CommentSource>) -> Self {
        Self { matches, comments }
    }

    /// Every match of `user_id`, newest first, with its comment thread.
    ///
    /// A thread that cannot be loaded is returned empty instead of failing
    /// the whole listing.
    pub async fn list_matches(&self, user_id: UserId) -> Result<Vec<MatchView>> {
        let mut views = self.matches.matches_of(user_id).await?;

        for view in views.iter_mut() {
            match self.comments.comments_of(view.id).await {
                Ok(comments) => view.comments = comments,
                Err(err) => {
                    metrics::counter!("comment_thread_failures_total").increment(1);
                    tracing::warn!(match_id = view.id, error = %err, "comment thread unavailable");
                    view.comments = Vec::new();
                },
            }
        }

        Ok(views)
    }
}
